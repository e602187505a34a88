use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::network_model::engine::engine_config::EngineConfig;
use crate::domain::network_model::grooming::grooming::{GroomingOutcome, apply_plan, end_to_end_grooming, release_service};
use crate::domain::network_model::lightpath::lightpath::Lightpath;
use crate::domain::network_model::lightpath::lightpath_registry::LightpathRegistry;
use crate::domain::network_model::request::modulation::{ModulationFormat, ModulationRow, ModulationTable};
use crate::domain::network_model::request::request::Request;
use crate::domain::network_model::routing::routing::{Routing, RoutingContext};
use crate::domain::network_model::sdn::block_reason::BlockReason;
use crate::domain::network_model::sdn::transaction::{RequestState, Segment, TransactionContext};
use crate::domain::network_model::snr::snr_measurements::SnrMeasurements;
use crate::domain::network_model::spectrum::spectrum_state::SpectrumState;
use crate::domain::network_model::spectrum_assignment::spectrum_assignment::SpectrumAssignment;
use crate::domain::network_model::topology::topology::NetworkTopology;
use crate::domain::network_model::utils::canonical::NodePair;
use crate::domain::network_model::utils::id::{LightpathId, NodeIndex, RequestId};
use crate::error::{Error, Result};

/// Lightpaths a committed request is spread over, with the bandwidth it holds on each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationRecord {
    pub endpoints: NodePair,
    pub bandwidth: i64,
    pub lightpaths: Vec<(LightpathId, i64)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    Committed,
    Blocked(BlockReason),
}

/// Result of one arrival, for statistics and logging.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOutcome {
    pub request_id: RequestId,
    pub bandwidth: i64,
    pub status: RequestStatus,
    pub was_groomed: bool,
    pub was_partially_groomed: bool,
    pub is_sliced: bool,

    /// Every lightpath carrying the request and its share. Empty if blocked.
    pub lightpaths: Vec<(LightpathId, i64)>,

    /// Lightpaths created for this request. One transponder each.
    pub new_lightpaths: Vec<LightpathId>,

    /// Path of the first lightpath carrying the request.
    pub path: Vec<NodeIndex>,
    pub path_length_km: f64,
    pub modulations: Vec<ModulationFormat>,
}

impl RequestOutcome {
    pub fn is_committed(&self) -> bool {
        self.status == RequestStatus::Committed
    }

    pub fn hops(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseOutcome {
    pub request_id: RequestId,
    pub returned_bandwidth: i64,

    /// Lightpaths torn down because they became empty.
    pub released_lightpaths: Vec<LightpathId>,
}

/// Provisions and releases requests.
///
/// Owns the spectrum state and the lightpath registry and is the only component that
/// commits changes to them. Every arrival ends committed or blocked within the call; a
/// blocked request leaves no trace in either structure.
#[derive(Debug)]
pub struct SdnController {
    topology: Arc<NetworkTopology>,
    spectrum: SpectrumState,
    registry: LightpathRegistry,
    allocations: HashMap<RequestId, AllocationRecord>,

    routing: Routing,
    assignment: SpectrumAssignment,
    snr: SnrMeasurements,

    modulation_table: ModulationTable,
    bw_per_slot: f64,
    grooming_enabled: bool,
    max_segments: usize,
}

impl SdnController {
    pub fn new(topology: Arc<NetworkTopology>, config: &EngineConfig) -> Self {
        let spectrum = SpectrumState::new(&topology, config.band_plan.clone(), config.cores_per_link);

        SdnController {
            topology,
            spectrum,
            registry: LightpathRegistry::new(),
            allocations: HashMap::new(),
            routing: Routing::new(config.routing_method, config.k_paths),
            assignment: SpectrumAssignment::new(config.allocation_method, config.guard_slots, config.cores_per_link),
            snr: SnrMeasurements::new(config.snr.clone(), config.cores_per_link),
            modulation_table: config.modulation_table.clone(),
            bw_per_slot: config.bw_per_slot,
            grooming_enabled: config.is_grooming_enabled,
            max_segments: config.max_segments,
        }
    }

    pub fn topology(&self) -> &NetworkTopology {
        &self.topology
    }

    pub fn spectrum(&self) -> &SpectrumState {
        &self.spectrum
    }

    pub fn registry(&self) -> &LightpathRegistry {
        &self.registry
    }

    pub fn allocation(&self, request_id: RequestId) -> Option<&AllocationRecord> {
        self.allocations.get(&request_id)
    }

    pub fn active_requests(&self) -> usize {
        self.allocations.len()
    }

    pub fn lightpath(&self, endpoints: NodePair, id: LightpathId) -> Option<&Lightpath> {
        self.registry.get(endpoints, id)
    }

    /// Grooming, then routing, spectrum assignment and signal quality check, then commit.
    pub fn handle_arrival(&mut self, request: &Request, now: f64) -> Result<RequestOutcome> {
        if self.allocations.contains_key(&request.id) {
            return Err(Error::InvariantViolation(format!("{} arrived while already provisioned", request.id)));
        }

        let mut context = TransactionContext::new(request);
        let mut residual = request.bandwidth;

        if self.grooming_enabled {
            match end_to_end_grooming(&self.registry, context.endpoints, request.bandwidth) {
                GroomingOutcome::Full(plan) => {
                    context.transition(RequestState::GroomedFull)?;
                    context.was_routed = true;
                    context.was_groomed = true;
                    context.grooming = Some(plan);
                    return self.commit(context, now);
                }
                GroomingOutcome::Partial(plan) => {
                    context.transition(RequestState::GroomedPartial)?;
                    context.was_partially_groomed = true;
                    residual = plan.residual_bandwidth;
                    context.grooming = Some(plan);
                }
                GroomingOutcome::NotGroomed => context.transition(RequestState::Ungroomed)?,
            }
        } else {
            context.transition(RequestState::Ungroomed)?;
        }

        if self.provision(&mut context, request, residual)? {
            self.commit(context, now)
        } else {
            self.block(context)
        }
    }

    /// Returns the request's bandwidth to its lightpaths and tears down the ones left empty.
    pub fn handle_release(&mut self, request_id: RequestId) -> Result<ReleaseOutcome> {
        let record = self
            .allocations
            .remove(&request_id)
            .ok_or_else(|| Error::InvariantViolation(format!("release of {} which is not provisioned", request_id)))?;

        let lightpath_ids: Vec<LightpathId> = record.lightpaths.iter().map(|(id, _)| *id).collect();
        let report = release_service(&mut self.registry, record.endpoints, request_id, &lightpath_ids)?;

        if report.returned_bandwidth != record.bandwidth {
            return Err(Error::InvariantViolation(format!(
                "{} returned {} Gbps but held {} Gbps",
                request_id, report.returned_bandwidth, record.bandwidth
            )));
        }

        for lightpath_id in &report.emptied {
            let lightpath = self
                .registry
                .remove(record.endpoints, *lightpath_id)
                .ok_or_else(|| Error::InvariantViolation(format!("{} vanished during release", lightpath_id)))?;
            self.spectrum.release_lightpath(&lightpath.path, &lightpath.placement, lightpath.id)?;
        }

        log::debug!("RequestReleased: {} returned {} Gbps, {} lightpath(s) torn down.", request_id, report.returned_bandwidth, report.emptied.len());

        Ok(ReleaseOutcome { request_id, returned_bandwidth: report.returned_bandwidth, released_lightpaths: report.emptied })
    }

    /// Reserves spectrum for `bandwidth` on one new lightpath, or sliced over several.
    /// On `false` nothing stays reserved.
    ///
    /// Lightpaths of a partial grooming plan count against `max_segments` when slicing.
    fn provision(&mut self, context: &mut TransactionContext, request: &Request, bandwidth: i64) -> Result<bool> {
        let groomed = context.grooming.as_ref().map_or(0, |plan| plan.portions.len());

        let row = self.row_for(request, bandwidth);
        let tier = if bandwidth == request.bandwidth { request.bandwidth } else { self.modulation_table.tier_for(bandwidth).unwrap_or(bandwidth) };

        if let Some(segment) = self.provision_segment(context, request, bandwidth, tier, &row)? {
            context.segments.push(segment);
            return Ok(true);
        }

        if self.max_segments <= 1 {
            return Ok(false);
        }

        for tier in self.modulation_table.tiers_below(bandwidth) {
            let segments_needed = (bandwidth + tier - 1) / tier;
            if groomed + segments_needed as usize > self.max_segments {
                break;
            }

            let Some(row) = self.modulation_table.row(tier).cloned() else {
                continue;
            };

            let mut reserved: Vec<Segment> = Vec::new();
            let mut remaining = bandwidth;

            while remaining > 0 {
                let part = remaining.min(tier);
                match self.provision_segment(context, request, part, tier, &row)? {
                    Some(segment) => {
                        reserved.push(segment);
                        remaining -= part;
                    }
                    None => break,
                }
            }

            if remaining == 0 {
                log::debug!("RequestSliced: {} split into {} segment(s) of {} Gbps.", request.id, reserved.len(), tier);
                context.is_sliced = true;
                context.segments.extend(reserved);
                return Ok(true);
            }

            self.rollback(&reserved)?;
        }

        Ok(false)
    }

    /// Walks candidate paths, formats and placements until one passes the signal quality
    /// check, then reserves its spectrum.
    fn provision_segment(&mut self, context: &mut TransactionContext, request: &Request, bandwidth: i64, tier: i64, row: &ModulationRow) -> Result<Option<Segment>> {
        let candidates = {
            let routing_context = RoutingContext { topology: &self.topology, spectrum: &self.spectrum, snr: &self.snr };
            self.routing.find_candidates(&routing_context, request.source, request.destination, row)
        };

        if candidates.is_empty() {
            context.block_reason = Some(BlockReason::Congestion);
            return Ok(None);
        }

        for candidate in candidates {
            context.transition(RequestState::PathSelected)?;

            if candidate.modulations.is_empty() {
                context.block_reason = Some(BlockReason::Distance);
                continue;
            }

            for modulation in &candidate.modulations {
                let Some(slots_needed) = row.slots_needed(*modulation) else {
                    continue;
                };

                let placements = self.assignment.candidate_placements(&self.spectrum, &candidate.path, slots_needed);
                if placements.is_empty() {
                    context.block_reason = Some(BlockReason::Congestion);
                    continue;
                }

                for placement in placements {
                    context.transition(RequestState::SpectrumFound)?;

                    let feasibility = self.snr.evaluate(&self.topology, &self.spectrum, &candidate.path, &placement, *modulation)?;
                    if let Some(reason) = feasibility.failure {
                        context.block_reason = Some(reason);
                        continue;
                    }

                    context.transition(RequestState::Feasible)?;
                    context.was_routed = true;

                    let lightpath_id = self.registry.next_id();
                    self.spectrum.allocate_lightpath(&candidate.path, &placement, lightpath_id)?;

                    let capacity = self.lightpath_capacity(tier, slots_needed, *modulation);

                    return Ok(Some(Segment {
                        lightpath_id,
                        path: candidate.path,
                        length_km: candidate.length_km,
                        placement,
                        modulation: *modulation,
                        capacity,
                        bandwidth,
                        snr_cost: feasibility.cost,
                    }));
                }
            }
        }

        Ok(None)
    }

    fn commit(&mut self, mut context: TransactionContext, now: f64) -> Result<RequestOutcome> {
        let mut lightpaths: Vec<(LightpathId, i64)> = Vec::new();
        let mut modulations = Vec::new();
        let mut path = Vec::new();
        let mut path_length_km = 0.0;

        if let Some(plan) = &context.grooming {
            apply_plan(&mut self.registry, plan, context.request_id)?;
            lightpaths.extend(plan.portions.iter().copied());

            for (id, _) in &plan.portions {
                if let Some(lightpath) = self.registry.get(context.endpoints, *id) {
                    modulations.push(lightpath.modulation);
                }
            }
            path = plan.path.clone();
            path_length_km = self.topology.path_length(&path);
        }

        for segment in &context.segments {
            let mut lightpath = Lightpath::new(
                segment.lightpath_id,
                segment.path.clone(),
                segment.placement,
                segment.modulation,
                segment.capacity,
                segment.snr_cost,
                now,
            );
            lightpath.assign(context.request_id, segment.bandwidth)?;
            self.registry.insert(lightpath)?;

            lightpaths.push((segment.lightpath_id, segment.bandwidth));
            modulations.push(segment.modulation);
        }

        if let (None, Some(first)) = (&context.grooming, context.segments.first()) {
            path = first.path.clone();
            path_length_km = first.length_km;
        }

        context.is_sliced = context.is_sliced || lightpaths.len() > 1;
        context.transition(RequestState::Committed)?;

        self.allocations.insert(context.request_id, AllocationRecord { endpoints: context.endpoints, bandwidth: context.bandwidth, lightpaths: lightpaths.clone() });

        log::debug!(
            "RequestCommitted: {} ({} Gbps) on {} lightpath(s), {} new.",
            context.request_id,
            context.bandwidth,
            lightpaths.len(),
            context.segments.len()
        );

        Ok(RequestOutcome {
            request_id: context.request_id,
            bandwidth: context.bandwidth,
            status: RequestStatus::Committed,
            was_groomed: context.was_groomed,
            was_partially_groomed: context.was_partially_groomed,
            is_sliced: context.is_sliced,
            lightpaths,
            new_lightpaths: context.segments.iter().map(|segment| segment.lightpath_id).collect(),
            path,
            path_length_km,
            modulations,
        })
    }

    fn block(&mut self, mut context: TransactionContext) -> Result<RequestOutcome> {
        let segments = std::mem::take(&mut context.segments);
        self.rollback(&segments)?;

        let reason = context.final_block_reason();
        context.transition(RequestState::Blocked(reason))?;

        log::debug!("RequestBlocked: {} ({} Gbps) blocked by {}.", context.request_id, context.bandwidth, reason);

        Ok(RequestOutcome {
            request_id: context.request_id,
            bandwidth: context.bandwidth,
            status: RequestStatus::Blocked(reason),
            was_groomed: false,
            was_partially_groomed: context.was_partially_groomed,
            is_sliced: false,
            lightpaths: Vec::new(),
            new_lightpaths: Vec::new(),
            path: Vec::new(),
            path_length_km: 0.0,
            modulations: Vec::new(),
        })
    }

    /// Frees the spectrum of segments that were reserved but never registered.
    fn rollback(&mut self, segments: &[Segment]) -> Result<()> {
        for segment in segments.iter().rev() {
            self.spectrum.release_lightpath(&segment.path, &segment.placement, segment.lightpath_id)?;
        }
        Ok(())
    }

    fn row_for(&self, request: &Request, bandwidth: i64) -> ModulationRow {
        if bandwidth == request.bandwidth {
            return request.mod_formats.clone();
        }

        self.modulation_table
            .tier_for(bandwidth)
            .and_then(|tier| self.modulation_table.row(tier))
            .cloned()
            .unwrap_or_else(|| request.mod_formats.clone())
    }

    fn lightpath_capacity(&self, tier: i64, slots_needed: usize, modulation: ModulationFormat) -> i64 {
        let spectral = (slots_needed as f64 * self.bw_per_slot * modulation.spectral_efficiency() as f64).floor() as i64;
        tier.max(spectral)
    }
}
