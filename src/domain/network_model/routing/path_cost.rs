use crate::domain::network_model::routing::routing_method::XtCostType;
use crate::domain::network_model::snr::snr_measurements::SnrMeasurements;
use crate::domain::network_model::spectrum::spectrum_state::SpectrumState;
use crate::domain::network_model::topology::topology::NetworkTopology;
use crate::domain::network_model::utils::canonical::path_links;
use crate::domain::network_model::utils::id::NodeIndex;

/// Share of occupied slots along the path.
pub fn congestion(state: &SpectrumState, path: &[NodeIndex]) -> f64 {
    state.path_occupancy(path)
}

/// Sum over the links of `beta * length / max_length + (1 - beta) * nli_cost`.
pub fn nli_path_cost(topology: &NetworkTopology, state: &SpectrumState, snr: &SnrMeasurements, path: &[NodeIndex], slots_needed: usize) -> f64 {
    let beta = snr.settings().beta;
    let max_length = topology.max_link_length();

    path_links(path)
        .filter_map(|key| Some((topology.link(key)?, state.link(key)?)))
        .map(|(link, spectrum)| {
            let nli = snr.nli_link_cost(link, spectrum, state.band_plan(), slots_needed);
            beta * link.length_km / max_length + (1.0 - beta) * nli
        })
        .sum()
}

/// Sum over the links of the crosstalk cost, in the requested variant.
pub fn xt_path_cost(topology: &NetworkTopology, state: &SpectrumState, snr: &SnrMeasurements, path: &[NodeIndex], cost_type: XtCostType) -> f64 {
    let beta = snr.settings().beta;
    let max_length = topology.max_link_length();

    path_links(path)
        .filter_map(|key| Some((topology.link(key)?, state.link(key)?)))
        .map(|(link, spectrum)| {
            let xt = snr.xt_link_cost(spectrum, state.band_plan());
            match cost_type {
                XtCostType::WithLength => beta * link.length_km / max_length + (1.0 - beta) * xt,
                XtCostType::WithoutLength => xt * link.num_spans(),
            }
        })
        .sum()
}
