pub mod snr_measurements;
pub mod snr_props;
pub mod snr_type;
