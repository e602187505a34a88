use lazy_static::lazy_static;
use std::collections::HashMap;

use crate::api::engine_config_dto::SnrSettingsDto;
use crate::domain::network_model::request::modulation::ModulationFormat;
use crate::domain::network_model::snr::snr_type::SnrCheckType;
use crate::error::{Error, Result};

/// Center frequency of the C band in Hz.
pub const LIGHT_FREQUENCY: f64 = 1.9341e14;

pub const PLANCK: f64 = 6.62607004e-34;

/// Spontaneous emission factor of the amplifiers.
pub const NSP: f64 = 1.8;

/// Symbol rate base of a request in Gbaud.
pub const REQ_BIT_RATE: f64 = 12.5;

/// Mean power coupling coefficient between neighboring cores, per m.
pub const MEAN_XT: f64 = 3.78e-9;

/// Launch power per channel in W.
pub const DEFAULT_INPUT_POWER: f64 = 1e-3;

lazy_static! {
    /// Minimum SNR in dB per modulation format.
    pub static ref DEFAULT_REQUIRED_SNR: HashMap<ModulationFormat, f64> = HashMap::from([
        (ModulationFormat::Bpsk, 3.71),
        (ModulationFormat::Qpsk, 6.72),
        (ModulationFormat::Qam8, 10.84),
        (ModulationFormat::Qam16, 13.24),
        (ModulationFormat::Qam32, 16.16),
        (ModulationFormat::Qam64, 19.01),
    ]);

    /// Maximum tolerated crosstalk in dB per modulation format.
    pub static ref DEFAULT_REQUESTED_XT: HashMap<ModulationFormat, f64> = HashMap::from([
        (ModulationFormat::Bpsk, -14.0),
        (ModulationFormat::Qpsk, -18.5),
        (ModulationFormat::Qam8, -21.0),
        (ModulationFormat::Qam16, -25.0),
        (ModulationFormat::Qam32, -27.0),
        (ModulationFormat::Qam64, -34.0),
    ]);

    /// Modulation dependent factor of the EGN correction term.
    pub static ref DEFAULT_PHI: HashMap<ModulationFormat, f64> = HashMap::from([
        (ModulationFormat::Qpsk, 1.0),
        (ModulationFormat::Qam16, 0.68),
        (ModulationFormat::Qam64, 0.6190476190476191),
    ]);
}

/// Validated physical layer settings.
#[derive(Debug, Clone)]
pub struct SnrSettings {
    pub check: SnrCheckType,

    /// Weight of the length term in the NLI and XT aware routing costs.
    pub beta: f64,

    /// Weight of the core overlap term in the XT link cost.
    pub theta: f64,

    pub input_power: f64,
    pub egn_model: bool,
    pub xt_noise: bool,

    /// Width of one slot in GHz.
    pub bw_per_slot: f64,

    pub phi: HashMap<ModulationFormat, f64>,
    pub requested_xt: HashMap<ModulationFormat, f64>,
    pub required_snr: HashMap<ModulationFormat, f64>,
}

impl SnrSettings {
    /// Settings with every value at its default and the given check enabled.
    pub fn new(check: SnrCheckType, bw_per_slot: f64) -> Self {
        SnrSettings {
            check,
            beta: 0.5,
            theta: 1.0,
            input_power: DEFAULT_INPUT_POWER,
            egn_model: false,
            xt_noise: false,
            bw_per_slot,
            phi: DEFAULT_PHI.clone(),
            requested_xt: DEFAULT_REQUESTED_XT.clone(),
            required_snr: DEFAULT_REQUIRED_SNR.clone(),
        }
    }

    pub fn from_dto(dto: &SnrSettingsDto, bw_per_slot: f64) -> Result<Self> {
        let check = match &dto.snr_type {
            Some(name) => name.parse::<SnrCheckType>()?,
            None => SnrCheckType::None,
        };

        let mut settings = SnrSettings::new(check, bw_per_slot);

        if let Some(beta) = dto.beta {
            settings.beta = unit_interval("beta", beta)?;
        }
        if let Some(theta) = dto.theta {
            settings.theta = unit_interval("theta", theta)?;
        }
        if let Some(power) = dto.input_power {
            if !(power > 0.0) {
                return Err(Error::ConfigurationError(format!("input_power must be positive, got {}", power)));
            }
            settings.input_power = power;
        }

        settings.egn_model = dto.egn_model;
        settings.xt_noise = dto.xt_noise;

        merge_table(&mut settings.phi, dto.phi.as_ref())?;
        merge_table(&mut settings.requested_xt, dto.requested_xt.as_ref())?;
        merge_table(&mut settings.required_snr, dto.requested_snr.as_ref())?;

        Ok(settings)
    }

    pub fn phi(&self, format: ModulationFormat) -> f64 {
        self.phi.get(&format).copied().unwrap_or(1.0)
    }

    /// Required SNR in dB. Formats without a threshold are never rejected.
    pub fn required_snr(&self, format: ModulationFormat) -> f64 {
        self.required_snr.get(&format).copied().unwrap_or(f64::NEG_INFINITY)
    }

    /// Tolerated crosstalk in dB. Formats without a threshold are never rejected.
    pub fn requested_xt(&self, format: ModulationFormat) -> f64 {
        self.requested_xt.get(&format).copied().unwrap_or(f64::INFINITY)
    }
}

fn unit_interval(name: &str, value: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(Error::ConfigurationError(format!("{} must be within [0, 1], got {}", name, value)))
    }
}

fn merge_table(target: &mut HashMap<ModulationFormat, f64>, overrides: Option<&HashMap<String, f64>>) -> Result<()> {
    for (name, value) in overrides.into_iter().flatten() {
        target.insert(name.parse::<ModulationFormat>()?, *value);
    }
    Ok(())
}
