pub mod allocation_method;
pub mod spectrum_assignment;
