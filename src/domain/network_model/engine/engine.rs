use std::sync::Arc;

use crate::domain::network_model::engine::engine_config::EngineConfig;
use crate::domain::network_model::engine::sim_stats::SimulationStats;
use crate::domain::network_model::request::request::Request;
use crate::domain::network_model::sdn::sdn_controller::{ReleaseOutcome, RequestOutcome, RequestStatus, SdnController};
use crate::domain::network_model::topology::topology::NetworkTopology;
use crate::domain::network_model::utils::canonical::NodePair;
use crate::domain::network_model::utils::id::{LightpathId, RequestId};
use crate::domain::network_model::utils::statistics::{self, StatParameter, StatisticEvent};
use crate::error::Result;

/// Identifies one simulation run in logs and statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct RunInfo {
    pub run_id: String,
    pub erlang: f64,
    pub seed: u64,
}

/// One simulation run: the controller plus everything that is recorded about it.
#[derive(Debug)]
pub struct Engine {
    controller: SdnController,
    stats: SimulationStats,
    run: RunInfo,
}

impl Engine {
    pub fn new(topology: Arc<NetworkTopology>, config: &EngineConfig, run: RunInfo) -> Self {
        let stats = SimulationStats::new(run.run_id.clone(), run.erlang, run.seed);
        Engine { controller: SdnController::new(topology, config), stats, run }
    }

    pub fn controller(&self) -> &SdnController {
        &self.controller
    }

    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    pub fn into_stats(self) -> SimulationStats {
        self.stats
    }

    pub fn handle_arrival(&mut self, request: &Request, now: f64) -> Result<RequestOutcome> {
        let outcome = self.controller.handle_arrival(request, now)?;
        self.stats.record_arrival(&outcome);

        if statistics::global_enabled() {
            self.emit_request_event(request, &outcome, now);
            for lightpath_id in &outcome.new_lightpaths {
                self.emit_lightpath_event(request.endpoints(), *lightpath_id, "created", now);
            }
        }

        Ok(outcome)
    }

    pub fn handle_release(&mut self, request_id: RequestId, now: f64) -> Result<ReleaseOutcome> {
        // Snapshot the lightpaths before they disappear from the registry.
        let snapshots: Vec<(LightpathId, StatisticEvent)> = match self.controller.allocation(request_id) {
            Some(record) if statistics::global_enabled() => record
                .lightpaths
                .iter()
                .filter_map(|(id, _)| self.lightpath_event(record.endpoints, *id, "released", now).map(|event| (*id, event)))
                .collect(),
            _ => Vec::new(),
        };

        let outcome = self.controller.handle_release(request_id)?;
        self.stats.record_release(&outcome);

        if statistics::global_enabled() {
            let mut event = self.base_event(now);
            event
                .set(StatParameter::LogDescription, "Request released")
                .set(StatParameter::RequestId, request_id.0)
                .set(StatParameter::Outcome, "released")
                .set(StatParameter::Bandwidth, outcome.returned_bandwidth);
            statistics::add_global_event(event);

            for (lightpath_id, event) in snapshots {
                if outcome.released_lightpaths.contains(&lightpath_id) {
                    statistics::add_global_event(event);
                }
            }
        }

        Ok(outcome)
    }

    fn base_event(&self, now: f64) -> StatisticEvent {
        let mut event = StatisticEvent::new();
        event.set(StatParameter::RunId, self.run.run_id.as_str()).set(StatParameter::Erlang, self.run.erlang).set(StatParameter::Seed, self.run.seed).set(StatParameter::Time, now);
        event
    }

    fn emit_request_event(&self, request: &Request, outcome: &RequestOutcome, now: f64) {
        let topology = self.controller.topology();
        let name = |index| topology.node_name(index).map(|id| id.to_string()).unwrap_or_default();

        let mut event = self.base_event(now);
        event
            .set(StatParameter::LogDescription, "Request arrived")
            .set(StatParameter::RequestId, request.id.0)
            .set(StatParameter::Source, name(request.source))
            .set(StatParameter::Destination, name(request.destination))
            .set(StatParameter::Bandwidth, request.bandwidth)
            .set(StatParameter::WasGroomed, outcome.was_groomed)
            .set(StatParameter::WasPartiallyGroomed, outcome.was_partially_groomed)
            .set(StatParameter::IsSliced, outcome.is_sliced)
            .set(StatParameter::NumTransponders, outcome.new_lightpaths.len());

        match outcome.status {
            RequestStatus::Committed => {
                let modulations: Vec<&str> = outcome.modulations.iter().map(|m| m.name()).collect();
                event
                    .set(StatParameter::Outcome, "committed")
                    .set(StatParameter::Hops, outcome.hops())
                    .set(StatParameter::PathLength, outcome.path_length_km)
                    .set(StatParameter::Modulations, modulations.join("|"));
            }
            RequestStatus::Blocked(reason) => {
                event.set(StatParameter::Outcome, "blocked").set(StatParameter::BlockReason, reason.as_str());
            }
        }

        statistics::add_global_event(event);
    }

    fn emit_lightpath_event(&self, endpoints: NodePair, lightpath_id: LightpathId, kind: &str, now: f64) {
        if let Some(event) = self.lightpath_event(endpoints, lightpath_id, kind, now) {
            statistics::add_global_event(event);
        }
    }

    fn lightpath_event(&self, endpoints: NodePair, lightpath_id: LightpathId, kind: &str, now: f64) -> Option<StatisticEvent> {
        let lightpath = self.controller.lightpath(endpoints, lightpath_id)?;

        let mut event = self.base_event(now);
        event
            .set(StatParameter::LogDescription, "Lightpath lifecycle")
            .set(StatParameter::LightpathId, lightpath_id.0)
            .set(StatParameter::LightpathEvent, kind)
            .set(StatParameter::LightpathBandwidth, lightpath.lightpath_bandwidth)
            .set(StatParameter::Hops, lightpath.path.len().saturating_sub(1))
            .set(StatParameter::Modulations, lightpath.modulation.name())
            .set(StatParameter::Band, lightpath.placement.band.to_string())
            .set(StatParameter::Core, lightpath.placement.core)
            .set(StatParameter::StartSlot, lightpath.placement.slots.start)
            .set(StatParameter::EndSlot, lightpath.placement.slots.end);

        Some(event)
    }
}
