use crate::domain::network_model::grooming::grooming::GroomingPlan;
use crate::domain::network_model::request::modulation::ModulationFormat;
use crate::domain::network_model::request::request::Request;
use crate::domain::network_model::sdn::block_reason::BlockReason;
use crate::domain::network_model::spectrum::placement::Placement;
use crate::domain::network_model::utils::canonical::NodePair;
use crate::domain::network_model::utils::id::{LightpathId, NodeIndex, RequestId};
use crate::error::{Error, Result};

/// Processing state of one arriving request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Arrived,
    GroomedFull,
    GroomedPartial,
    Ungroomed,
    PathSelected,
    SpectrumFound,
    Feasible,
    Committed,
    Blocked(BlockReason),
}

impl RequestState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestState::Committed | RequestState::Blocked(_))
    }

    fn can_become(&self, next: RequestState) -> bool {
        use RequestState::*;

        match (self, next) {
            (Committed | Blocked(_), _) => false,
            (_, Blocked(_)) => true,
            (Arrived, GroomedFull | GroomedPartial | Ungroomed) => true,
            (GroomedFull, Committed) => true,
            (GroomedPartial | Ungroomed, PathSelected) => true,
            // Retries: next path, next format or next placement.
            (PathSelected, PathSelected | SpectrumFound) => true,
            (SpectrumFound, PathSelected | SpectrumFound | Feasible) => true,
            // A sliced request selects a path again for every further segment.
            (Feasible, PathSelected | Committed) => true,
            _ => false,
        }
    }
}

/// A new lightpath reserved in the spectrum but not yet registered.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub lightpath_id: LightpathId,
    pub path: Vec<NodeIndex>,
    pub length_km: f64,
    pub placement: Placement,
    pub modulation: ModulationFormat,

    /// Capacity of the new lightpath.
    pub capacity: i64,

    /// Bandwidth of the request carried on it.
    pub bandwidth: i64,
    pub snr_cost: f64,
}

/// Scratch state of one request while the controller works on it. Never outlives the call
/// that created it.
#[derive(Debug, Clone)]
pub struct TransactionContext {
    pub request_id: RequestId,
    pub endpoints: NodePair,
    pub bandwidth: i64,

    state: RequestState,

    pub was_routed: bool,
    pub was_groomed: bool,
    pub was_partially_groomed: bool,
    pub is_sliced: bool,

    /// Reason of the most recent failed attempt.
    pub block_reason: Option<BlockReason>,

    pub grooming: Option<GroomingPlan>,

    /// New lightpaths reserved so far, in provisioning order.
    pub segments: Vec<Segment>,
}

impl TransactionContext {
    pub fn new(request: &Request) -> Self {
        TransactionContext {
            request_id: request.id,
            endpoints: request.endpoints(),
            bandwidth: request.bandwidth,
            state: RequestState::Arrived,
            was_routed: false,
            was_groomed: false,
            was_partially_groomed: false,
            is_sliced: false,
            block_reason: None,
            grooming: None,
            segments: Vec::new(),
        }
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn transition(&mut self, next: RequestState) -> Result<()> {
        if !self.state.can_become(next) {
            return Err(Error::InvariantViolation(format!("{} cannot move from {:?} to {:?}", self.request_id, self.state, next)));
        }

        log::trace!("RequestTransition: {} {:?} -> {:?}", self.request_id, self.state, next);
        self.state = next;
        Ok(())
    }

    /// Reason to report when the request ends up blocked. Defaults to congestion.
    pub fn final_block_reason(&self) -> BlockReason {
        self.block_reason.unwrap_or(BlockReason::Congestion)
    }
}
