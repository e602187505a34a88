use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::network_model::request::modulation::ModulationFormat;
use crate::domain::network_model::sdn::block_reason::BlockReason;
use crate::domain::network_model::sdn::sdn_controller::{ReleaseOutcome, RequestOutcome, RequestStatus};

/// Aggregate counters of one simulation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimulationStats {
    pub run_id: String,
    pub erlang: f64,
    pub seed: u64,

    pub total_requests: usize,
    pub blocked_requests: usize,
    pub total_bandwidth: i64,
    pub blocked_bandwidth: i64,
    pub block_reasons: BTreeMap<BlockReason, usize>,

    /// New lightpaths created, one transponder each.
    pub transponders: usize,
    pub groomed_requests: usize,
    pub partially_groomed_requests: usize,
    pub sliced_requests: usize,

    pub lightpaths_created: usize,
    pub lightpaths_released: usize,
    pub released_requests: usize,

    /// New lightpaths per modulation format.
    pub modulation_usage: BTreeMap<ModulationFormat, usize>,

    pub blocking_probability: f64,
    pub bit_rate_blocking_probability: f64,
    pub average_hops: f64,
    pub average_path_length_km: f64,
    pub transponders_per_request: f64,

    #[serde(skip)]
    total_hops: usize,
    #[serde(skip)]
    total_path_length: f64,
}

impl SimulationStats {
    pub fn new(run_id: impl Into<String>, erlang: f64, seed: u64) -> Self {
        SimulationStats { run_id: run_id.into(), erlang, seed, ..Default::default() }
    }

    pub fn record_arrival(&mut self, outcome: &RequestOutcome) {
        self.total_requests += 1;
        self.total_bandwidth += outcome.bandwidth;

        match outcome.status {
            RequestStatus::Blocked(reason) => {
                self.blocked_requests += 1;
                self.blocked_bandwidth += outcome.bandwidth;
                *self.block_reasons.entry(reason).or_insert(0) += 1;
            }
            RequestStatus::Committed => {
                self.transponders += outcome.new_lightpaths.len();
                self.lightpaths_created += outcome.new_lightpaths.len();

                if outcome.was_groomed {
                    self.groomed_requests += 1;
                }
                if outcome.was_partially_groomed {
                    self.partially_groomed_requests += 1;
                }
                if outcome.is_sliced {
                    self.sliced_requests += 1;
                }

                // Formats of groomed lightpaths come first, new ones last.
                let new_count = outcome.new_lightpaths.len();
                for format in outcome.modulations.iter().skip(outcome.modulations.len().saturating_sub(new_count)) {
                    *self.modulation_usage.entry(*format).or_insert(0) += 1;
                }

                self.total_hops += outcome.hops();
                self.total_path_length += outcome.path_length_km;
            }
        }

        self.refresh();
    }

    pub fn record_release(&mut self, outcome: &ReleaseOutcome) {
        self.released_requests += 1;
        self.lightpaths_released += outcome.released_lightpaths.len();
    }

    pub fn committed_requests(&self) -> usize {
        self.total_requests - self.blocked_requests
    }

    fn refresh(&mut self) {
        let committed = self.committed_requests();

        self.blocking_probability = ratio(self.blocked_requests as f64, self.total_requests as f64);
        self.bit_rate_blocking_probability = ratio(self.blocked_bandwidth as f64, self.total_bandwidth as f64);
        self.average_hops = ratio(self.total_hops as f64, committed as f64);
        self.average_path_length_km = ratio(self.total_path_length, committed as f64);
        self.transponders_per_request = ratio(self.transponders as f64, committed as f64);
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 { 0.0 } else { numerator / denominator }
}
