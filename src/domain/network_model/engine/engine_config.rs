use crate::api::engine_config_dto::EngineConfigDto;
use crate::domain::network_model::request::modulation::{ModulationTable, parse_bandwidth};
use crate::domain::network_model::request::request_generator::RequestGenerator;
use crate::domain::network_model::routing::routing_method::RoutingMethod;
use crate::domain::network_model::snr::snr_props::SnrSettings;
use crate::domain::network_model::spectrum::band::{BandPlan, SpectrumBand};
use crate::domain::network_model::spectrum_assignment::allocation_method::AllocationMethod;
use crate::error::{ConversionError, Error, Result};

/// Tolerance when checking that the request distribution sums to one.
const DISTRIBUTION_TOLERANCE: f64 = 1e-6;

const DEFAULT_BAND_ORDER: [SpectrumBand; 3] = [SpectrumBand::C, SpectrumBand::L, SpectrumBand::S];

/// Validated simulation settings. All strategy names are resolved here, once.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub holding_time: f64,
    pub erlangs: Vec<f64>,
    pub thread_erlangs: bool,
    pub guard_slots: usize,
    pub num_requests: usize,

    /// Bandwidth to share of generated requests, ascending by bandwidth.
    pub request_distribution: Vec<(i64, f64)>,

    /// Largest number of new lightpaths one request may be sliced into. 1 disables slicing.
    pub max_segments: usize,

    pub allocation_method: AllocationMethod,
    pub routing_method: RoutingMethod,
    pub k_paths: usize,
    pub seeds: Vec<u64>,
    pub is_grooming_enabled: bool,
    pub print_step: usize,

    /// Slot width in GHz.
    pub bw_per_slot: f64,
    pub cores_per_link: usize,
    pub band_plan: BandPlan,
    pub snr: SnrSettings,
    pub modulation_table: ModulationTable,
}

impl TryFrom<EngineConfigDto> for EngineConfig {
    type Error = Error;

    fn try_from(dto: EngineConfigDto) -> Result<Self> {
        let general = &dto.general_settings;
        let topology = &dto.topology_settings;

        if !(general.holding_time > 0.0) {
            return Err(Error::ConfigurationError(format!("holding_time must be positive, got {}", general.holding_time)));
        }
        if general.erlangs.is_empty() || general.erlangs.iter().any(|e| !(*e > 0.0)) {
            return Err(Error::ConfigurationError("erlangs must list at least one positive load".to_string()));
        }
        if topology.cores_per_link == 0 {
            return Err(Error::ConfigurationError("cores_per_link must be at least 1".to_string()));
        }
        if !(topology.bw_per_slot > 0.0) {
            return Err(Error::ConfigurationError(format!("bw_per_slot must be positive, got {}", topology.bw_per_slot)));
        }
        if general.max_segments == 0 {
            return Err(Error::ConfigurationError("max_segments must be at least 1".to_string()));
        }

        let allocation_method: AllocationMethod = general.allocation_method.parse()?;
        let routing_method = RoutingMethod::resolve(&general.route_method, dto.snr_settings.xt_type.as_deref())?;

        let k_paths = match (routing_method.uses_k_paths(), general.k_paths) {
            (false, _) => 1,
            (true, Some(k)) if k > 0 => k,
            (true, Some(_)) => return Err(Error::ConfigurationError("k_paths must be at least 1".to_string())),
            (true, None) => return Err(ConversionError::MissingParameter("k_paths".to_string()).into()),
        };

        let modulation_table = ModulationTable::try_from(&dto.mod_per_bw)?;
        let request_distribution = Self::parse_distribution(general.request_distribution.iter(), &modulation_table)?;
        let band_plan = Self::build_band_plan(&dto)?;
        let snr = SnrSettings::from_dto(&dto.snr_settings, topology.bw_per_slot)?;

        let config = EngineConfig {
            holding_time: general.holding_time,
            erlangs: general.erlangs.clone(),
            thread_erlangs: general.thread_erlangs,
            guard_slots: general.guard_slots,
            num_requests: general.num_requests,
            request_distribution,
            max_segments: general.max_segments,
            allocation_method,
            routing_method,
            k_paths,
            seeds: general.seeds.clone(),
            is_grooming_enabled: general.is_grooming_enabled,
            print_step: general.print_step,
            bw_per_slot: topology.bw_per_slot,
            cores_per_link: topology.cores_per_link,
            band_plan,
            snr,
            modulation_table,
        };

        log::info!(
            "EngineConfig: routing {}, allocation {}, {} core(s), {} slot(s), grooming {}, max segments {}.",
            config.routing_method,
            config.allocation_method,
            config.cores_per_link,
            config.band_plan.total_slots(),
            config.is_grooming_enabled,
            config.max_segments
        );

        Ok(config)
    }
}

impl EngineConfig {
    /// Offered arrival rate for a load in Erlang, spread over all cores of a link.
    pub fn arrival_rate(&self, erlang: f64) -> f64 {
        self.cores_per_link as f64 * erlang / self.holding_time
    }

    pub fn request_generator(&self, erlang: f64) -> Result<RequestGenerator> {
        RequestGenerator::new(self.num_requests, self.arrival_rate(erlang), self.holding_time, self.request_distribution.clone())
    }

    /// Configured seeds, or a single seed 0 if none are given.
    pub fn run_seeds(&self) -> Vec<u64> {
        if self.seeds.is_empty() { vec![0] } else { self.seeds.clone() }
    }

    fn parse_distribution<'a>(entries: impl Iterator<Item = (&'a String, &'a f64)>, table: &ModulationTable) -> Result<Vec<(i64, f64)>> {
        let mut distribution = Vec::new();

        for (key, share) in entries {
            let bandwidth = parse_bandwidth(key)?;

            if !(*share >= 0.0) {
                return Err(Error::ConfigurationError(format!("share of {} Gbps must not be negative", bandwidth)));
            }
            if *share > 0.0 && table.row(bandwidth).is_none() {
                return Err(Error::ConfigurationError(format!("{} Gbps requested but missing from mod_per_bw", bandwidth)));
            }

            distribution.push((bandwidth, *share));
        }

        let total: f64 = distribution.iter().map(|(_, share)| share).sum();
        if (total - 1.0).abs() > DISTRIBUTION_TOLERANCE {
            return Err(Error::ConfigurationError(format!("request_distribution sums to {}, expected 1", total)));
        }

        distribution.sort_by_key(|(bandwidth, _)| *bandwidth);
        Ok(distribution)
    }

    fn build_band_plan(dto: &EngineConfigDto) -> Result<BandPlan> {
        let spectrum = &dto.spectrum_settings;

        let mut order: Vec<SpectrumBand> = match &spectrum.band_order {
            Some(names) => names.iter().map(|name| name.parse::<SpectrumBand>()).collect::<std::result::Result<_, _>>()?,
            None => Vec::new(),
        };
        for band in DEFAULT_BAND_ORDER {
            if !order.contains(&band) {
                order.push(band);
            }
        }

        let bands = order
            .into_iter()
            .map(|band| {
                let slots = match band {
                    SpectrumBand::C => spectrum.c_band,
                    SpectrumBand::L => spectrum.l_band,
                    SpectrumBand::S => spectrum.s_band,
                };
                (band, slots)
            })
            .collect();

        BandPlan::new(bands)
    }
}
