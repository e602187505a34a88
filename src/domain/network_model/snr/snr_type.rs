use std::str::FromStr;

use crate::error::ConversionError;

/// Which signal quality check gates a new lightpath.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnrCheckType {
    /// Only reach from the modulation table is checked.
    #[default]
    None,
    /// ASE plus nonlinear interference SNR against the modulation threshold.
    SnrNli,
    /// Inter-core crosstalk against the modulation threshold.
    Xt,
    /// SNR with crosstalk noise, followed by the crosstalk threshold.
    SnrXt,
}

impl FromStr for SnrCheckType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "None" | "none" => Ok(SnrCheckType::None),
            "snr_calculation_nli" => Ok(SnrCheckType::SnrNli),
            "xt_calculation" => Ok(SnrCheckType::Xt),
            "snr_calculation_xt" => Ok(SnrCheckType::SnrXt),
            _ => Err(ConversionError::UnknownSnrType(s.to_string())),
        }
    }
}
