pub mod lightpath;
pub mod lightpath_registry;
