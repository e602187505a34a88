pub mod canonical;
pub mod id;
pub mod statistics;
