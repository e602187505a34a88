use std::collections::BTreeMap;

use crate::domain::network_model::request::modulation::ModulationFormat;
use crate::domain::network_model::spectrum::placement::Placement;
use crate::domain::network_model::utils::canonical::NodePair;
use crate::domain::network_model::utils::id::{LightpathId, NodeIndex, RequestId};
use crate::error::{Error, Result};

/// An established optical connection, possibly shared by several requests.
///
/// At all times `sum(requests) + remaining_bandwidth == lightpath_bandwidth`.
#[derive(Debug, Clone)]
pub struct Lightpath {
    pub id: LightpathId,
    pub endpoints: NodePair,
    pub path: Vec<NodeIndex>,
    pub placement: Placement,
    pub modulation: ModulationFormat,

    /// Capacity in Gbps.
    pub lightpath_bandwidth: i64,
    pub remaining_bandwidth: i64,

    /// Result of the signal quality check at setup (SNR or XT in dB).
    pub snr_cost: f64,

    /// Bandwidth carried for each request.
    requests: BTreeMap<RequestId, i64>,

    pub created_at: f64,
}

impl Lightpath {
    pub fn new(
        id: LightpathId,
        path: Vec<NodeIndex>,
        placement: Placement,
        modulation: ModulationFormat,
        lightpath_bandwidth: i64,
        snr_cost: f64,
        created_at: f64,
    ) -> Self {
        let endpoints = NodePair::new(path.first().copied().unwrap_or_default(), path.last().copied().unwrap_or_default());

        Lightpath {
            id,
            endpoints,
            path,
            placement,
            modulation,
            lightpath_bandwidth,
            remaining_bandwidth: lightpath_bandwidth,
            snr_cost,
            requests: BTreeMap::new(),
            created_at,
        }
    }

    pub fn requests(&self) -> &BTreeMap<RequestId, i64> {
        &self.requests
    }

    pub fn carries(&self, request_id: RequestId) -> bool {
        self.requests.contains_key(&request_id)
    }

    /// `true` if no request uses the lightpath anymore.
    pub fn is_empty(&self) -> bool {
        self.remaining_bandwidth == self.lightpath_bandwidth
    }

    /// Reserves `bandwidth` for `request_id`.
    pub fn assign(&mut self, request_id: RequestId, bandwidth: i64) -> Result<()> {
        if bandwidth <= 0 || bandwidth > self.remaining_bandwidth {
            return Err(Error::InvariantViolation(format!(
                "{} cannot carry {} Gbps for {}, only {} Gbps left",
                self.id, bandwidth, request_id, self.remaining_bandwidth
            )));
        }
        if self.requests.contains_key(&request_id) {
            return Err(Error::InvariantViolation(format!("{} already carries {}", self.id, request_id)));
        }

        self.requests.insert(request_id, bandwidth);
        self.remaining_bandwidth -= bandwidth;

        self.check_conservation()
    }

    /// Returns the bandwidth `request_id` held on this lightpath.
    pub fn release(&mut self, request_id: RequestId) -> Result<i64> {
        let bandwidth = self
            .requests
            .remove(&request_id)
            .ok_or_else(|| Error::InvariantViolation(format!("{} does not carry {}", self.id, request_id)))?;

        self.remaining_bandwidth += bandwidth;
        self.check_conservation()?;

        Ok(bandwidth)
    }

    pub fn check_conservation(&self) -> Result<()> {
        let reserved: i64 = self.requests.values().sum();

        if reserved + self.remaining_bandwidth != self.lightpath_bandwidth || self.remaining_bandwidth < 0 {
            return Err(Error::InvariantViolation(format!(
                "{} bandwidth out of balance: reserved {} + remaining {} != capacity {}",
                self.id, reserved, self.remaining_bandwidth, self.lightpath_bandwidth
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::network_model::spectrum::band::SpectrumBand;

    fn lightpath() -> Lightpath {
        Lightpath::new(LightpathId(1), vec![0, 1], Placement::new(SpectrumBand::C, 0, 0, 2, 0), ModulationFormat::Qpsk, 100, 20.0, 0.0)
    }

    #[test]
    fn assign_and_release_balance() {
        let mut lp = lightpath();
        lp.assign(RequestId(1), 60).unwrap();
        lp.assign(RequestId(2), 40).unwrap();
        assert_eq!(lp.remaining_bandwidth, 0);

        assert!(lp.assign(RequestId(3), 1).is_err());
        assert_eq!(lp.release(RequestId(1)).unwrap(), 60);
        assert_eq!(lp.release(RequestId(2)).unwrap(), 40);
        assert!(lp.is_empty());
    }

    #[test]
    fn releasing_unknown_request_fails() {
        let mut lp = lightpath();
        assert!(matches!(lp.release(RequestId(9)), Err(Error::InvariantViolation(_))));
    }
}
