mod common;

use common::{TestConfig, topology};
use eon_sim::domain::network_model::engine::engine::{Engine, RunInfo};
use eon_sim::domain::network_model::engine::sim_stats::SimulationStats;
use eon_sim::domain::network_model::request::request::Request;
use eon_sim::domain::network_model::routing::routing_method::RoutingMethod;
use eon_sim::domain::network_model::sdn::block_reason::BlockReason;
use eon_sim::domain::network_model::utils::id::RequestId;
use eon_sim::domain::simulator::simulator::Simulator;
use eon_sim::domain::simulator::sweep::run_sweep;
use eon_sim::load_inputs;

const MESH: [(&str, &str, f64); 6] = [("A", "B", 300.0), ("B", "C", 250.0), ("C", "D", 400.0), ("D", "A", 350.0), ("A", "C", 500.0), ("B", "D", 450.0)];

fn run_info(seed: u64) -> RunInfo {
    RunInfo { run_id: format!("test-{}", seed), erlang: 10.0, seed }
}

#[test]
fn test_departure_frees_spectrum_for_arrival_at_same_instant() {
    let config = TestConfig::default().build();
    let topology = topology(&[("A", "B", 100.0)]);
    let row = config.modulation_table.row(100).unwrap().clone();

    let make = |id: u64, arrive: f64, depart: f64| Request { id: RequestId(id), source: 0, destination: 1, bandwidth: 100, arrive, depart, mod_formats: row.clone() };
    let requests = vec![make(1, 0.0, 5.0), make(2, 5.0, 6.0), make(3, 5.5, 7.0)];

    let engine = Engine::new(topology, &config, run_info(1));
    let stats = Simulator::new(engine, 0).run(&requests).unwrap();

    assert_eq!(stats.total_requests, 3);
    assert_eq!(stats.blocked_requests, 1);
    assert_eq!(stats.block_reasons.get(&BlockReason::Congestion), Some(&1));
    assert_eq!(stats.released_requests, 2);
    assert_eq!(stats.lightpaths_created, 2);
    assert_eq!(stats.lightpaths_released, 2);
    assert!((stats.blocking_probability - 1.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_sweep_releases_everything_it_commits() {
    let mut config = TestConfig { route_method: "k_shortest_path", k_paths: 2, c_band: 16, cores: 2, ..Default::default() }.build();
    config.erlangs = vec![5.0, 50.0];
    config.seeds = vec![3, 4];

    let results = run_sweep(&config, topology(&MESH)).unwrap();
    assert_eq!(results.len(), 4);

    for stats in &results {
        assert_eq!(stats.total_requests, config.num_requests);
        assert_eq!(stats.released_requests, stats.committed_requests());
        assert_eq!(stats.lightpaths_created, stats.lightpaths_released);
        assert_eq!(stats.block_reasons.values().sum::<usize>(), stats.blocked_requests);
        assert!(stats.blocking_probability >= 0.0 && stats.blocking_probability <= 1.0);
    }

    let order: Vec<(f64, u64)> = results.iter().map(|stats| (stats.erlang, stats.seed)).collect();
    assert_eq!(order, vec![(5.0, 3), (5.0, 4), (50.0, 3), (50.0, 4)]);
}

#[test]
fn test_threaded_sweep_matches_sequential_sweep() {
    let mut config = TestConfig { grooming: true, c_band: 8, max_segments: 2, ..Default::default() }.build();
    config.erlangs = vec![2.0, 20.0];

    let sequential = run_sweep(&config, topology(&MESH)).unwrap();
    config.thread_erlangs = true;
    let threaded = run_sweep(&config, topology(&MESH)).unwrap();

    let summary = |results: &[SimulationStats]| {
        results.iter().map(|stats| (stats.erlang, stats.blocked_requests, stats.transponders, stats.groomed_requests)).collect::<Vec<_>>()
    };
    assert_eq!(summary(&sequential), summary(&threaded));
}

#[test]
fn test_sample_inputs_load() {
    let inputs = load_inputs("data/config.json", "data/nsfnet.json", None).unwrap();

    assert_eq!(inputs.topology.node_count(), 14);
    assert_eq!(inputs.topology.link_count(), 21);
    assert!(inputs.topology.is_connected());
    assert_eq!(inputs.config.routing_method, RoutingMethod::KShortestPath);
    assert_eq!(inputs.config.cores_per_link, 7);
    assert!(inputs.trace.is_none());
}
