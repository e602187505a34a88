use serde::Deserialize;
use std::collections::HashMap;

use crate::api::engine_config_dto::ModulationEntryDto;

/// A pre-generated request trace, replayed instead of the built-in arrival process.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestTraceDto {
    pub requests: Vec<RequestDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestDto {
    pub req_id: u64,
    pub source: String,
    pub destination: String,
    pub bandwidth: i64,
    pub arrive: f64,
    pub depart: f64,

    /// Per-request modulation table. Falls back to the configured table row for `bandwidth`.
    #[serde(default)]
    pub mod_formats: Option<HashMap<String, ModulationEntryDto>>,
}
