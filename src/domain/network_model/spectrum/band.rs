use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::{ConversionError, Error, Result};

/// A spectral band of the fiber. Each band has its own slot grid per core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SpectrumBand {
    #[serde(rename = "l")]
    L,
    #[serde(rename = "c")]
    C,
    #[serde(rename = "s")]
    S,
}

impl FromStr for SpectrumBand {
    type Err = ConversionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "l" => Ok(SpectrumBand::L),
            "c" => Ok(SpectrumBand::C),
            "s" => Ok(SpectrumBand::S),
            _ => Err(ConversionError::UnknownBand(s.to_string())),
        }
    }
}

impl fmt::Display for SpectrumBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SpectrumBand::L => "l",
            SpectrumBand::C => "c",
            SpectrumBand::S => "s",
        };
        write!(f, "{}", name)
    }
}

/// Which bands exist, how many slots each one has, and in which order they are searched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandPlan {
    /// Bands in search order, each with its slot count. Only bands with slots are kept.
    bands: Vec<(SpectrumBand, usize)>,
}

impl BandPlan {
    pub fn new(bands: Vec<(SpectrumBand, usize)>) -> Result<Self> {
        let bands: Vec<(SpectrumBand, usize)> = bands.into_iter().filter(|(_, slots)| *slots > 0).collect();

        if bands.is_empty() {
            return Err(Error::ConfigurationError("no spectral band has any slots".to_string()));
        }

        for (i, (band, _)) in bands.iter().enumerate() {
            if bands[..i].iter().any(|(other, _)| other == band) {
                return Err(Error::ConfigurationError(format!("band '{}' listed twice", band)));
            }
        }

        Ok(BandPlan { bands })
    }

    /// A plan with only the C band.
    pub fn c_band_only(slots: usize) -> Result<Self> {
        BandPlan::new(vec![(SpectrumBand::C, slots)])
    }

    /// Bands in search order.
    pub fn bands(&self) -> impl Iterator<Item = SpectrumBand> + '_ {
        self.bands.iter().map(|(band, _)| *band)
    }

    pub fn slots_in(&self, band: SpectrumBand) -> Option<usize> {
        self.bands.iter().find(|(b, _)| *b == band).map(|(_, slots)| *slots)
    }

    pub fn total_slots(&self) -> usize {
        self.bands.iter().map(|(_, slots)| slots).sum()
    }

    /// Offset of the first slot of `band` on the absolute frequency grid.
    /// The grid is laid out L, then C, then S, independent of the search order.
    pub fn slot_offset(&self, band: SpectrumBand) -> usize {
        let mut offset = 0;
        for candidate in [SpectrumBand::L, SpectrumBand::C, SpectrumBand::S] {
            if candidate == band {
                return offset;
            }
            offset += self.slots_in(candidate).unwrap_or(0);
        }
        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_follow_frequency_grid() {
        let plan = BandPlan::new(vec![(SpectrumBand::C, 320), (SpectrumBand::L, 400), (SpectrumBand::S, 0)]).unwrap();

        assert_eq!(plan.bands().collect::<Vec<_>>(), vec![SpectrumBand::C, SpectrumBand::L]);
        assert_eq!(plan.slot_offset(SpectrumBand::L), 0);
        assert_eq!(plan.slot_offset(SpectrumBand::C), 400);
        assert_eq!(plan.total_slots(), 720);
    }

    #[test]
    fn rejects_empty_and_duplicate_bands() {
        assert!(BandPlan::new(vec![(SpectrumBand::C, 0)]).is_err());
        assert!(BandPlan::new(vec![(SpectrumBand::C, 4), (SpectrumBand::C, 4)]).is_err());
        assert_eq!("C".parse::<SpectrumBand>(), Ok(SpectrumBand::C));
        assert!("x".parse::<SpectrumBand>().is_err());
    }
}
