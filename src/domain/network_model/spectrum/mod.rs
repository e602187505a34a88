pub mod band;
pub mod link_spectrum;
pub mod placement;
pub mod slot_range;
pub mod spectrum_state;
