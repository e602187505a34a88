use std::fmt;
use std::str::FromStr;

use crate::error::ConversionError;

/// Strategy used to pick a slot range on a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationMethod {
    /// Lowest free start slot, cores in ascending order.
    FirstFit,
    /// Highest free start slot, cores in ascending order.
    LastFit,
    /// Free run with the smallest leftover after placing the window.
    BestFit,
    /// First fit, visiting non-adjacent cores first.
    PriorityFirst,
}

impl FromStr for AllocationMethod {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first_fit" => Ok(AllocationMethod::FirstFit),
            "last_fit" => Ok(AllocationMethod::LastFit),
            "best_fit" => Ok(AllocationMethod::BestFit),
            "priority_first" => Ok(AllocationMethod::PriorityFirst),
            _ => Err(ConversionError::UnknownAllocationMethod(s.to_string())),
        }
    }
}

impl fmt::Display for AllocationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AllocationMethod::FirstFit => "first_fit",
            AllocationMethod::LastFit => "last_fit",
            AllocationMethod::BestFit => "best_fit",
            AllocationMethod::PriorityFirst => "priority_first",
        };
        write!(f, "{}", name)
    }
}
