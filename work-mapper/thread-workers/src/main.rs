// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use work_mapper_core::SequentialMapper;
use work_mapper_thread_workers::thread_pool_mapper;
use work_mapper_walker_sim::{AtomicShutdownSignal, RunConfig, Simulation};

/// Weighted-ensemble style walker simulation on a pool of worker threads
#[derive(Parser, Debug)]
#[command(name = "walker-threads")]
struct Args {
    /// Path to the run configuration
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Override the number of worker threads
    #[arg(long)]
    workers: Option<usize>,

    /// Override the number of cycles
    #[arg(long)]
    cycles: Option<usize>,

    /// Evaluate segments in the calling thread instead of the pool
    #[arg(long)]
    sequential: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let mut config = RunConfig::load_or_default(&args.config);
    if let Some(workers) = args.workers {
        config.mapper.num_workers = workers;
    }
    if let Some(cycles) = args.cycles {
        config.num_cycles = cycles;
    }

    let shutdown = AtomicShutdownSignal::new();
    let ctrl_c = shutdown.clone();
    ctrlc::set_handler(move || {
        eprintln!("\n=== Ctrl+C received, finishing current cycle ===");
        ctrl_c.shutdown();
    })
    .context("failed to install Ctrl+C handler")?;

    info!(
        walkers = config.num_walkers,
        cycles = config.num_cycles,
        segment_length = config.segment_length,
        workers = config.mapper.num_workers,
        sequential = args.sequential,
        "Starting walker simulation"
    );

    let function = config.runner.segment_fn();
    let walkers = config.initial_walkers();
    let report = if args.sequential {
        Simulation::new(SequentialMapper::new(function), shutdown, config.segment_length)
            .run(walkers, config.num_cycles)
    } else {
        Simulation::new(
            thread_pool_mapper(function, config.mapper.clone()),
            shutdown,
            config.segment_length,
        )
        .run(walkers, config.num_cycles)
    }
    .context("simulation failed")?;

    print!("{}", report);
    Ok(())
}
