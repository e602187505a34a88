mod common;

use common::{TestConfig, controller, request, topology};
use eon_sim::domain::network_model::request::modulation::ModulationFormat;
use eon_sim::domain::network_model::routing::routing::{Routing, RoutingContext};
use eon_sim::domain::network_model::routing::routing_method::RoutingMethod;
use eon_sim::domain::network_model::snr::snr_measurements::SnrMeasurements;
use eon_sim::domain::network_model::spectrum::spectrum_state::SpectrumState;

const RING: [(&str, &str, f64); 5] = [("A", "B", 100.0), ("B", "C", 100.0), ("C", "D", 150.0), ("D", "A", 100.0), ("A", "C", 400.0)];

#[test]
fn test_k_shortest_candidates_in_length_order() {
    let config = TestConfig { route_method: "k_shortest_path", k_paths: 3, ..Default::default() }.build();
    let topology = topology(&RING);
    let spectrum = SpectrumState::new(&topology, config.band_plan.clone(), config.cores_per_link);
    let snr = SnrMeasurements::new(config.snr.clone(), config.cores_per_link);
    let context = RoutingContext { topology: &topology, spectrum: &spectrum, snr: &snr };

    let (a, c) = (topology.node_index("A").unwrap(), topology.node_index("C").unwrap());
    let row = config.modulation_table.row(100).unwrap();

    let mut routing = Routing::new(RoutingMethod::KShortestPath, 3);
    let candidates = routing.find_candidates(&context, a, c, row);

    let lengths: Vec<f64> = candidates.iter().map(|candidate| candidate.length_km).collect();
    assert_eq!(lengths, vec![200.0, 250.0, 400.0]);
    assert!(candidates.iter().all(|candidate| candidate.modulations == vec![ModulationFormat::Qpsk]));

    let (path, modulation) = routing.select_path(&context, a, c, row);
    assert_eq!(topology.path_names(&path), vec!["A", "B", "C"]);
    assert_eq!(modulation, Some(ModulationFormat::Qpsk));
}

#[test]
fn test_next_candidate_used_when_shortest_is_full() {
    let config = TestConfig { route_method: "k_shortest_path", k_paths: 3, ..Default::default() }.build();
    let mut controller = controller(&RING, &config);

    let filler = request(&controller, &config, 1, "A", "B", 100, 100);
    assert!(controller.handle_arrival(&filler, 1.0).unwrap().is_committed());

    let req = request(&controller, &config, 2, "A", "C", 25, 25);
    let outcome = controller.handle_arrival(&req, 2.0).unwrap();

    assert!(outcome.is_committed());
    assert_eq!(controller.topology().path_names(&outcome.path), vec!["A", "D", "C"]);
    assert_eq!(outcome.path_length_km, 250.0);
}

#[test]
fn test_least_congested_avoids_loaded_links() {
    let shortest = TestConfig { route_method: "k_shortest_path", c_band: 8, ..Default::default() }.build();
    let least = TestConfig { route_method: "least_congested", c_band: 8, ..Default::default() }.build();

    for (config, expected) in [(shortest, vec!["A", "B", "C"]), (least, vec!["A", "D", "C"])] {
        let mut controller = controller(&RING, &config);

        let load = request(&controller, &config, 1, "B", "C", 100, 100);
        assert!(controller.handle_arrival(&load, 1.0).unwrap().is_committed());

        let req = request(&controller, &config, 2, "A", "C", 25, 25);
        let outcome = controller.handle_arrival(&req, 2.0).unwrap();
        assert_eq!(controller.topology().path_names(&outcome.path), expected, "{}", config.routing_method);
    }
}

#[test]
fn test_aware_routers_return_every_reachable_candidate() {
    for route in ["nli_aware", "least_congested"] {
        let config = TestConfig { route_method: route, k_paths: 2, ..Default::default() }.build();
        let topology = topology(&RING);
        let spectrum = SpectrumState::new(&topology, config.band_plan.clone(), config.cores_per_link);
        let snr = SnrMeasurements::new(config.snr.clone(), config.cores_per_link);
        let context = RoutingContext { topology: &topology, spectrum: &spectrum, snr: &snr };

        let mut routing = Routing::new(config.routing_method, config.k_paths);
        let candidates = routing.find_candidates(&context, 0, 2, config.modulation_table.row(25).unwrap());

        assert_eq!(candidates.len(), 2, "{}", route);
        assert!(candidates.windows(2).all(|pair| pair[0].weight <= pair[1].weight), "{}", route);
    }
}

#[test]
fn test_xt_aware_ranking_depends_on_cost_variant() {
    let expected = [("with_length", vec!["A-D-C", "A-B-C", "A-C"]), ("without_length", vec!["A-D-C", "A-C", "A-B-C"])];

    for (xt_type, order) in expected {
        let config = TestConfig { route_method: "xt_aware", xt_type: Some(xt_type), k_paths: 3, cores: 2, c_band: 8, ..Default::default() }.build();
        let mut controller = controller(&RING, &config);

        // Core 0 of B-C fills half its slots, so four free cells of core 1 sit next to traffic.
        let load = request(&controller, &config, 1, "B", "C", 100, 100);
        let outcome = controller.handle_arrival(&load, 1.0).unwrap();
        assert_eq!(controller.topology().path_names(&outcome.path), vec!["B", "C"]);

        let snr = SnrMeasurements::new(config.snr.clone(), config.cores_per_link);
        let context = RoutingContext { topology: controller.topology(), spectrum: controller.spectrum(), snr: &snr };
        let (a, c) = (context.topology.node_index("A").unwrap(), context.topology.node_index("C").unwrap());

        let mut routing = Routing::new(config.routing_method, config.k_paths);
        let candidates = routing.find_candidates(&context, a, c, config.modulation_table.row(25).unwrap());

        let names: Vec<String> = candidates.iter().map(|candidate| context.topology.path_names(&candidate.path).join("-")).collect();
        assert_eq!(names, order, "{}", xt_type);
    }
}
