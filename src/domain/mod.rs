pub mod network_model;
pub mod simulator;
