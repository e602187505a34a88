use anyhow::Context;
use clap::Parser;
use colored::Colorize;

use eon_sim::domain::network_model::engine::sim_stats::SimulationStats;
use eon_sim::domain::network_model::utils::statistics;
use eon_sim::domain::simulator::sweep::{run_sweep, run_trace};
use eon_sim::{load_inputs, logger};

#[derive(Parser, Debug)]
#[clap(about = "Provisioning simulator for elastic optical networks on multi-core fibers", long_about = None)]
struct Args {
    /// Engine configuration (JSON)
    #[clap(short, long)]
    config: String,

    /// Network topology (JSON)
    #[clap(short, long)]
    topology: String,

    /// Replay this request trace (JSON) instead of generating requests
    #[clap(short, long)]
    requests: Option<String>,

    /// Write the per-run summary as JSON
    #[clap(short, long)]
    output: Option<String>,

    /// Write per-request and per-lightpath events as CSV
    #[clap(long)]
    stats_csv: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init();
    if let Some(path) = &args.stats_csv {
        statistics::init_global(Some(path.as_str())).with_context(|| format!("failed to open statistics file '{}'", path))?;
    }

    let inputs = load_inputs(&args.config, &args.topology, args.requests.as_deref()).context("failed to load simulation inputs")?;

    let results = match &inputs.trace {
        Some(requests) => vec![run_trace(&inputs.config, inputs.topology.clone(), requests)?],
        None => run_sweep(&inputs.config, inputs.topology.clone())?,
    };

    statistics::flush_global();

    if let Some(output) = &args.output {
        let json = serde_json::to_string_pretty(&results)?;
        std::fs::write(output, json).with_context(|| format!("failed to write summary to '{}'", output))?;
        log::info!("Main: summary written to '{}'.", output);
    }

    print_summary(&results);
    Ok(())
}

fn print_summary(results: &[SimulationStats]) {
    println!("{}", "Simulation summary".bold());
    for stats in results {
        let blocking = format!("{:.4}", stats.blocking_probability);
        let blocking = if stats.blocked_requests == 0 { blocking.green() } else { blocking.yellow() };

        println!(
            "  erlang {:>7.1}  seed {:>3}  requests {:>6}  blocked {} (bit-rate {:.4})  transponders {:>6}  avg hops {:.2}  avg length {:.1} km",
            stats.erlang,
            stats.seed,
            stats.total_requests,
            blocking,
            stats.bit_rate_blocking_probability,
            stats.transponders,
            stats.average_hops,
            stats.average_path_length_km
        );

        for (reason, count) in &stats.block_reasons {
            println!("      {} {}", format!("{:>10}", reason.as_str()).red(), count);
        }
    }
}
