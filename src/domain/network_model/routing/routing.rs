use std::collections::HashMap;

use crate::domain::network_model::request::modulation::{ModulationFormat, ModulationRow};
use crate::domain::network_model::routing::k_shortest_paths::k_shortest_paths;
use crate::domain::network_model::routing::path_cost::{congestion, nli_path_cost, xt_path_cost};
use crate::domain::network_model::routing::routing_method::RoutingMethod;
use crate::domain::network_model::snr::snr_measurements::SnrMeasurements;
use crate::domain::network_model::spectrum::spectrum_state::SpectrumState;
use crate::domain::network_model::topology::topology::NetworkTopology;
use crate::domain::network_model::utils::id::NodeIndex;

/// A path offered to the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidatePath {
    pub path: Vec<NodeIndex>,
    pub length_km: f64,

    /// Formats whose reach covers the path, most efficient first. Empty if the path is too long.
    pub modulations: Vec<ModulationFormat>,

    /// Strategy metric the candidates were ranked by (length, occupancy, NLI or XT cost).
    pub weight: f64,
}

/// Read-only views the routing strategies may consult.
pub struct RoutingContext<'a> {
    pub topology: &'a NetworkTopology,
    pub spectrum: &'a SpectrumState,
    pub snr: &'a SnrMeasurements,
}

/// Computes candidate paths between two nodes.
///
/// The k shortest paths of a node pair only depend on the immutable topology and are cached.
#[derive(Debug, Clone)]
pub struct Routing {
    method: RoutingMethod,
    k_paths: usize,
    path_cache: HashMap<(NodeIndex, NodeIndex), Vec<Vec<NodeIndex>>>,
}

impl Routing {
    pub fn new(method: RoutingMethod, k_paths: usize) -> Self {
        let k_paths = if method.uses_k_paths() { k_paths.max(1) } else { 1 };
        Routing { method, k_paths, path_cache: HashMap::new() }
    }

    pub fn method(&self) -> RoutingMethod {
        self.method
    }

    /// All candidates in strategy order. Ties keep the shortest path order.
    pub fn find_candidates(&mut self, context: &RoutingContext, source: NodeIndex, destination: NodeIndex, mod_formats: &ModulationRow) -> Vec<CandidatePath> {
        let paths = self.paths_between(context.topology, source, destination);

        let mut candidates: Vec<CandidatePath> = paths
            .into_iter()
            .map(|path| {
                let length_km = context.topology.path_length(&path);
                let modulations = mod_formats.feasible_formats(length_km);
                let weight = self.weight(context, &path, length_km, mod_formats);
                CandidatePath { path, length_km, modulations, weight }
            })
            .collect();

        if !matches!(self.method, RoutingMethod::ShortestPath | RoutingMethod::KShortestPath) {
            candidates.sort_by(|a, b| a.weight.total_cmp(&b.weight));
        }

        if candidates.is_empty() {
            log::debug!(
                "NoPathFound: {} => {}",
                context.topology.node_name(source).map(|n| n.to_string()).unwrap_or_default(),
                context.topology.node_name(destination).map(|n| n.to_string()).unwrap_or_default()
            );
        }

        candidates
    }

    /// The preferred path and its most efficient reachable format.
    ///
    /// An empty path means no route exists; `None` as format means the path is too long for
    /// every format.
    pub fn select_path(
        &mut self,
        context: &RoutingContext,
        source: NodeIndex,
        destination: NodeIndex,
        mod_formats: &ModulationRow,
    ) -> (Vec<NodeIndex>, Option<ModulationFormat>) {
        match self.find_candidates(context, source, destination, mod_formats).into_iter().next() {
            Some(candidate) => {
                let modulation = candidate.modulations.first().copied();
                (candidate.path, modulation)
            }
            None => (Vec::new(), None),
        }
    }

    fn paths_between(&mut self, topology: &NetworkTopology, source: NodeIndex, destination: NodeIndex) -> Vec<Vec<NodeIndex>> {
        let k = self.k_paths;
        self.path_cache.entry((source, destination)).or_insert_with(|| k_shortest_paths(topology, source, destination, k)).clone()
    }

    fn weight(&self, context: &RoutingContext, path: &[NodeIndex], length_km: f64, mod_formats: &ModulationRow) -> f64 {
        match self.method {
            RoutingMethod::ShortestPath | RoutingMethod::KShortestPath => length_km,
            RoutingMethod::LeastCongested => congestion(context.spectrum, path),
            RoutingMethod::NliAware => {
                let slots_needed = mod_formats
                    .slots_needed(ModulationFormat::Qpsk)
                    .or_else(|| mod_formats.longest_reach().and_then(|format| mod_formats.slots_needed(format)))
                    .unwrap_or(1);
                nli_path_cost(context.topology, context.spectrum, context.snr, path, slots_needed)
            }
            RoutingMethod::XtAware(cost_type) => xt_path_cost(context.topology, context.spectrum, context.snr, path, cost_type),
        }
    }
}
