use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::api::engine_config_dto::ModulationEntryDto;
use crate::error::{ConversionError, Error, Result};

/// Modulation formats, ordered from the most robust to the most spectrally efficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ModulationFormat {
    #[serde(rename = "BPSK")]
    Bpsk,
    #[serde(rename = "QPSK")]
    Qpsk,
    #[serde(rename = "8-QAM")]
    Qam8,
    #[serde(rename = "16-QAM")]
    Qam16,
    #[serde(rename = "32-QAM")]
    Qam32,
    #[serde(rename = "64-QAM")]
    Qam64,
}

impl ModulationFormat {
    pub const ALL: [ModulationFormat; 6] =
        [ModulationFormat::Bpsk, ModulationFormat::Qpsk, ModulationFormat::Qam8, ModulationFormat::Qam16, ModulationFormat::Qam32, ModulationFormat::Qam64];

    /// Bits per symbol.
    pub fn spectral_efficiency(&self) -> u32 {
        match self {
            ModulationFormat::Bpsk => 1,
            ModulationFormat::Qpsk => 2,
            ModulationFormat::Qam8 => 3,
            ModulationFormat::Qam16 => 4,
            ModulationFormat::Qam32 => 5,
            ModulationFormat::Qam64 => 6,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ModulationFormat::Bpsk => "BPSK",
            ModulationFormat::Qpsk => "QPSK",
            ModulationFormat::Qam8 => "8-QAM",
            ModulationFormat::Qam16 => "16-QAM",
            ModulationFormat::Qam32 => "32-QAM",
            ModulationFormat::Qam64 => "64-QAM",
        }
    }
}

impl FromStr for ModulationFormat {
    type Err = ConversionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ModulationFormat::ALL.into_iter().find(|format| format.name().eq_ignore_ascii_case(s)).ok_or_else(|| ConversionError::UnknownModulationFormat(s.to_string()))
    }
}

impl fmt::Display for ModulationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Reach and spectrum demand of one modulation format for one bandwidth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModulationEntry {
    pub max_length_km: f64,
    pub slots_needed: usize,
}

/// All modulation formats available for one bandwidth.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModulationRow {
    entries: BTreeMap<ModulationFormat, ModulationEntry>,
}

impl ModulationRow {
    pub fn new(entries: impl IntoIterator<Item = (ModulationFormat, ModulationEntry)>) -> Self {
        ModulationRow { entries: entries.into_iter().collect() }
    }

    pub fn get(&self, format: ModulationFormat) -> Option<&ModulationEntry> {
        self.entries.get(&format)
    }

    pub fn slots_needed(&self, format: ModulationFormat) -> Option<usize> {
        self.entries.get(&format).map(|entry| entry.slots_needed)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Formats whose reach covers `path_length_km`, most spectrally efficient first.
    pub fn feasible_formats(&self, path_length_km: f64) -> Vec<ModulationFormat> {
        self.entries.iter().rev().filter(|(_, entry)| entry.max_length_km >= path_length_km).map(|(format, _)| *format).collect()
    }

    /// The format with the longest reach. Ties go to the more efficient format.
    pub fn longest_reach(&self) -> Option<ModulationFormat> {
        self.entries
            .iter()
            .rev()
            .fold(None::<(ModulationFormat, f64)>, |best, (format, entry)| match best {
                Some((_, reach)) if reach >= entry.max_length_km => best,
                _ => Some((*format, entry.max_length_km)),
            })
            .map(|(format, _)| format)
    }
}

impl TryFrom<&HashMap<String, ModulationEntryDto>> for ModulationRow {
    type Error = Error;

    fn try_from(dto: &HashMap<String, ModulationEntryDto>) -> Result<Self> {
        let mut entries = BTreeMap::new();

        for (name, entry) in dto {
            let format: ModulationFormat = name.parse()?;

            if entry.slots_needed == 0 {
                return Err(Error::ConfigurationError(format!("modulation '{}' needs zero slots", name)));
            }
            if !(entry.max_length > 0.0) {
                return Err(Error::ConfigurationError(format!("modulation '{}' has non-positive reach {}", name, entry.max_length)));
            }

            entries.insert(format, ModulationEntry { max_length_km: entry.max_length, slots_needed: entry.slots_needed });
        }

        Ok(ModulationRow { entries })
    }
}

/// Modulation rows per request bandwidth (Gbps). The bandwidths double as slicing tiers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModulationTable {
    rows: BTreeMap<i64, ModulationRow>,
}

impl ModulationTable {
    pub fn new(rows: impl IntoIterator<Item = (i64, ModulationRow)>) -> Self {
        ModulationTable { rows: rows.into_iter().collect() }
    }

    pub fn row(&self, bandwidth: i64) -> Option<&ModulationRow> {
        self.rows.get(&bandwidth)
    }

    /// Configured bandwidths, ascending.
    pub fn tiers(&self) -> impl Iterator<Item = i64> + '_ {
        self.rows.keys().copied()
    }

    /// Configured bandwidths strictly below `bandwidth`, descending.
    pub fn tiers_below(&self, bandwidth: i64) -> Vec<i64> {
        self.rows.range(..bandwidth).rev().map(|(tier, _)| *tier).collect()
    }

    /// The smallest configured bandwidth that can carry `bandwidth` on its own.
    pub fn tier_for(&self, bandwidth: i64) -> Option<i64> {
        self.rows.range(bandwidth..).next().map(|(tier, _)| *tier)
    }
}

impl TryFrom<&HashMap<String, HashMap<String, ModulationEntryDto>>> for ModulationTable {
    type Error = Error;

    fn try_from(dto: &HashMap<String, HashMap<String, ModulationEntryDto>>) -> Result<Self> {
        let mut rows = BTreeMap::new();

        for (key, row) in dto {
            let bandwidth = parse_bandwidth(key)?;
            rows.insert(bandwidth, ModulationRow::try_from(row)?);
        }

        if rows.is_empty() {
            return Err(Error::ConfigurationError("modulation table is empty".to_string()));
        }

        Ok(ModulationTable { rows })
    }
}

/// Parses a bandwidth key such as `"100"`. Keys must be positive integers.
pub fn parse_bandwidth(key: &str) -> std::result::Result<i64, ConversionError> {
    match key.trim().parse::<i64>() {
        Ok(bandwidth) if bandwidth > 0 => Ok(bandwidth),
        _ => Err(ConversionError::InvalidBandwidth(key.to_string())),
    }
}
