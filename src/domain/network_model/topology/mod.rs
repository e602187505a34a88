pub mod fiber;
pub mod topology;
