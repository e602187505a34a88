pub mod engine;
pub mod grooming;
pub mod lightpath;
pub mod request;
pub mod routing;
pub mod sdn;
pub mod snr;
pub mod spectrum;
pub mod spectrum_assignment;
pub mod topology;
pub mod utils;
