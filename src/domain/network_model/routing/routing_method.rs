use std::fmt;
use std::str::FromStr;

use crate::error::ConversionError;

/// How the crosstalk aware router weighs a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XtCostType {
    /// Blend of normalized length and XT cost, weighted by `beta`.
    WithLength,
    /// XT cost scaled by the number of spans.
    WithoutLength,
}

impl FromStr for XtCostType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "with_length" => Ok(XtCostType::WithLength),
            "without_length" => Ok(XtCostType::WithoutLength),
            _ => Err(ConversionError::UnknownXtType(s.to_string())),
        }
    }
}

/// Path selection strategy, resolved once from the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingMethod {
    ShortestPath,
    KShortestPath,
    LeastCongested,
    NliAware,
    XtAware(XtCostType),
}

impl RoutingMethod {
    /// Resolves a routing name. `xt_aware` additionally needs the XT cost variant.
    pub fn resolve(name: &str, xt_type: Option<&str>) -> Result<Self, ConversionError> {
        match name {
            "shortest_path" => Ok(RoutingMethod::ShortestPath),
            "k_shortest_path" => Ok(RoutingMethod::KShortestPath),
            "least_congested" => Ok(RoutingMethod::LeastCongested),
            "nli_aware" => Ok(RoutingMethod::NliAware),
            "xt_aware" => match xt_type {
                Some(cost) => Ok(RoutingMethod::XtAware(cost.parse()?)),
                None => Err(ConversionError::MissingParameter("xt_type".to_string())),
            },
            _ => Err(ConversionError::UnknownRoutingMethod(name.to_string())),
        }
    }

    /// Whether the strategy needs more than one candidate path.
    pub fn uses_k_paths(&self) -> bool {
        !matches!(self, RoutingMethod::ShortestPath)
    }
}

impl fmt::Display for RoutingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingMethod::ShortestPath => write!(f, "shortest_path"),
            RoutingMethod::KShortestPath => write!(f, "k_shortest_path"),
            RoutingMethod::LeastCongested => write!(f, "least_congested"),
            RoutingMethod::NliAware => write!(f, "nli_aware"),
            RoutingMethod::XtAware(XtCostType::WithLength) => write!(f, "xt_aware(with_length)"),
            RoutingMethod::XtAware(XtCostType::WithoutLength) => write!(f, "xt_aware(without_length)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_names() {
        assert_eq!(RoutingMethod::resolve("least_congested", None), Ok(RoutingMethod::LeastCongested));
        assert_eq!(RoutingMethod::resolve("xt_aware", Some("without_length")), Ok(RoutingMethod::XtAware(XtCostType::WithoutLength)));
        assert!(RoutingMethod::resolve("xt_aware", None).is_err());
        assert_eq!(RoutingMethod::resolve("widest", None), Err(ConversionError::UnknownRoutingMethod("widest".to_string())));
    }
}
