pub mod engine;
pub mod engine_config;
pub mod sim_stats;
