use serde::Deserialize;

/// Physical topology as read from disk. Each entry is one undirected fiber link.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TopologyDto {
    #[serde(default)]
    pub name: Option<String>,
    pub links: Vec<LinkDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkDto {
    pub source: String,
    pub destination: String,

    /// Link length in km.
    pub length: f64,

    /// Amplifier span length in km. Defaults to 100 km.
    #[serde(default)]
    pub span_length: Option<f64>,

    #[serde(default)]
    pub fiber: Option<FiberDto>,
}

/// Optional per-link overrides of the fiber model. Missing values fall back to the defaults
/// of `FiberProperties`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FiberDto {
    pub attenuation_db_per_km: Option<f64>,
    pub dispersion: Option<f64>,
    pub non_linearity: Option<f64>,
    pub bending_radius: Option<f64>,
    pub mode_coupling_co: Option<f64>,
    pub propagation_const: Option<f64>,
    pub core_pitch: Option<f64>,
}
