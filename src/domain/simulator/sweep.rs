use std::sync::Arc;
use std::thread;
use uuid::Uuid;

use crate::domain::network_model::engine::engine::{Engine, RunInfo};
use crate::domain::network_model::engine::engine_config::EngineConfig;
use crate::domain::network_model::engine::sim_stats::SimulationStats;
use crate::domain::network_model::request::request::Request;
use crate::domain::network_model::topology::topology::NetworkTopology;
use crate::domain::simulator::simulator::Simulator;
use crate::error::{Error, Result};

/// Target of the run lifecycle events.
pub const ANALYTICS_TARGET: &str = "analytics";

/// Runs every (erlang, seed) combination with private state.
///
/// With `thread_erlangs` every load runs on its own thread; results keep the configured order.
pub fn run_sweep(config: &EngineConfig, topology: Arc<NetworkTopology>) -> Result<Vec<SimulationStats>> {
    if !config.thread_erlangs {
        let mut results = Vec::new();
        for erlang in &config.erlangs {
            results.extend(run_erlang(config, topology.clone(), *erlang)?);
        }
        return Ok(results);
    }

    let per_erlang: Vec<Result<Vec<SimulationStats>>> = thread::scope(|scope| {
        let handles: Vec<_> = config
            .erlangs
            .iter()
            .map(|erlang| {
                let topology = topology.clone();
                scope.spawn(move || run_erlang(config, topology, *erlang))
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|_| Err(Error::InvariantViolation("simulation thread panicked".to_string()))))
            .collect()
    });

    let mut results = Vec::new();
    for stats in per_erlang {
        results.extend(stats?);
    }
    Ok(results)
}

fn run_erlang(config: &EngineConfig, topology: Arc<NetworkTopology>, erlang: f64) -> Result<Vec<SimulationStats>> {
    let generator = config.request_generator(erlang)?;

    config
        .run_seeds()
        .into_iter()
        .map(|seed| {
            let requests = generator.generate(&topology, &config.modulation_table, seed)?;
            run_single(config, topology.clone(), erlang, seed, &requests)
        })
        .collect()
}

/// Replays a fixed request list once.
pub fn run_trace(config: &EngineConfig, topology: Arc<NetworkTopology>, requests: &[Request]) -> Result<SimulationStats> {
    run_single(config, topology, 0.0, 0, requests)
}

fn run_single(config: &EngineConfig, topology: Arc<NetworkTopology>, erlang: f64, seed: u64, requests: &[Request]) -> Result<SimulationStats> {
    let run_id = Uuid::new_v4().to_string();

    tracing::info!(
        target: ANALYTICS_TARGET,
        RunId = %run_id,
        Erlang = erlang,
        Seed = seed,
        Requests = requests.len(),
        "Simulation run started"
    );

    let engine = Engine::new(topology, config, RunInfo { run_id: run_id.clone(), erlang, seed });
    let stats = Simulator::new(engine, config.print_step).run(requests)?;

    tracing::info!(
        target: ANALYTICS_TARGET,
        RunId = %run_id,
        Erlang = erlang,
        Seed = seed,
        BlockingProbability = stats.blocking_probability,
        Transponders = stats.transponders,
        "Simulation run finished"
    );

    Ok(stats)
}
