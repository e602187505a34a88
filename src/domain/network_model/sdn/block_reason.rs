use serde::Serialize;
use std::fmt;

/// Why a request could not be provisioned. Blocking is a normal outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    /// No path, or no path-wide free spectrum.
    Congestion,
    /// No modulation format reaches far enough on any candidate path.
    Distance,
    /// The signal to noise ratio is below the modulation threshold on every candidate.
    Snr,
    /// Inter-core crosstalk exceeds the modulation threshold on every candidate.
    Xt,
}

impl BlockReason {
    pub const ALL: [BlockReason; 4] = [BlockReason::Congestion, BlockReason::Distance, BlockReason::Snr, BlockReason::Xt];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockReason::Congestion => "congestion",
            BlockReason::Distance => "distance",
            BlockReason::Snr => "snr",
            BlockReason::Xt => "xt",
        }
    }
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
