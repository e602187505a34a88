pub mod modulation;
pub mod request;
pub mod request_generator;
