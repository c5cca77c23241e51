// main.rs
//
// This file contains the main entry point for the cache hierarchy
// simulator. It provides a command-line interface for running a
// trace-driven simulation against a JSON-configured memory hierarchy.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use cache_hierarchy_sim::config;
use cache_hierarchy_sim::controller::MemoryController;
use cache_hierarchy_sim::report;
use cache_hierarchy_sim::trace::{Op, TraceReader};

#[derive(Parser)]
#[command(name = "cachesim")]
#[command(about = "A trace-driven multi-level cache hierarchy simulator")]
#[command(version)]
struct Cli {
    /// Path to the cache configuration JSON file
    #[arg(long)]
    config: PathBuf,

    /// Path to the memory access trace file
    #[arg(long)]
    trace: PathBuf,

    /// Number of times to replay the trace before averaging counters
    #[arg(long, default_value_t = 3)]
    warmup: i64,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("{}", format!("Error: {err}").bold().red());
            ExitCode::FAILURE
        },
    }
}

fn run(cli: &Cli) -> Result<(), cache_hierarchy_sim::CacheSimError> {
    let (config_value, hierarchy) = config::load_hierarchy(&cli.config)?;
    let mut controller = MemoryController::new(hierarchy);

    for _ in 0..cli.warmup.max(0) {
        run_trace_pass(&mut controller, &cli.trace)?;
    }

    controller.collect_prefetch_information();
    controller.calculate_amat(0);
    controller.metrics.calculate_average_metrics(cli.warmup);

    let config_json = serde_json::to_string_pretty(&config_value).ok();
    let terminal_report = controller.metrics.render(config_json.as_deref(), true);
    println!("{terminal_report}");

    let file_report = controller.metrics.render(config_json.as_deref(), false);
    report::save_report(&cli.trace, &cli.config, &file_report);

    Ok(())
}

fn run_trace_pass(
    controller: &mut MemoryController,
    trace_path: &std::path::Path,
) -> Result<(), cache_hierarchy_sim::CacheSimError> {
    let reader = TraceReader::open(trace_path)?;
    for access in reader {
        match access.op {
            Op::Read => controller.read(access.address),
            Op::Write => controller.write(access.address),
        }
    }
    Ok(())
}
