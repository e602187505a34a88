use serde::Deserialize;
use std::collections::HashMap;

/// Raw simulation configuration. Validated into `EngineConfig` before a run starts.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfigDto {
    pub general_settings: GeneralSettingsDto,
    pub topology_settings: TopologySettingsDto,
    pub spectrum_settings: SpectrumSettingsDto,

    #[serde(default)]
    pub snr_settings: SnrSettingsDto,

    /// Bandwidth (as string key, e.g. "100") to modulation format name to reach/slot entry.
    pub mod_per_bw: HashMap<String, HashMap<String, ModulationEntryDto>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralSettingsDto {
    pub holding_time: f64,
    pub erlangs: Vec<f64>,

    #[serde(default)]
    pub thread_erlangs: bool,

    pub guard_slots: usize,
    pub num_requests: usize,

    /// Bandwidth key to share of generated requests. Shares must sum to 1.
    pub request_distribution: HashMap<String, f64>,

    #[serde(default = "default_max_segments")]
    pub max_segments: usize,

    pub allocation_method: String,
    pub route_method: String,

    #[serde(default)]
    pub k_paths: Option<usize>,

    #[serde(default)]
    pub seeds: Vec<u64>,

    #[serde(default)]
    pub is_grooming_enabled: bool,

    /// Log progress every `print_step` requests. 0 disables progress output.
    #[serde(default)]
    pub print_step: usize,
}

fn default_max_segments() -> usize {
    1
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TopologySettingsDto {
    /// Width of one spectral slot in GHz.
    pub bw_per_slot: f64,
    pub cores_per_link: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpectrumSettingsDto {
    pub c_band: usize,

    #[serde(default)]
    pub l_band: usize,

    #[serde(default)]
    pub s_band: usize,

    /// Order in which bands are searched. Defaults to C, L, S (bands with zero slots are skipped).
    #[serde(default)]
    pub band_order: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnrSettingsDto {
    /// One of `snr_calculation_nli`, `xt_calculation`, `snr_calculation_xt`. Absent disables the check.
    pub snr_type: Option<String>,

    /// `with_length` or `without_length`, used by `xt_aware` routing.
    pub xt_type: Option<String>,

    pub beta: Option<f64>,
    pub theta: Option<f64>,

    /// Launch power per channel in W.
    pub input_power: Option<f64>,

    #[serde(default)]
    pub egn_model: bool,

    #[serde(default)]
    pub xt_noise: bool,

    pub phi: Option<HashMap<String, f64>>,
    pub requested_xt: Option<HashMap<String, f64>>,
    pub requested_snr: Option<HashMap<String, f64>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModulationEntryDto {
    /// Maximum transparent reach in km.
    pub max_length: f64,
    pub slots_needed: usize,
}
