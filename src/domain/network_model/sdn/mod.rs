pub mod block_reason;
pub mod sdn_controller;
pub mod transaction;
