// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use work_mapper_core::{SequentialMapper, WorkerPoolMapper};
use work_mapper_process_workers::{serve_worker, ProcessWorkerFactory};
use work_mapper_walker_sim::{AtomicShutdownSignal, RunConfig, SegmentRunner, Simulation};

/// Walker simulation whose segments run in worker processes
#[derive(Parser, Debug)]
#[command(name = "walker-processes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the simulation, spawning one worker process per pool slot
    Run {
        /// Path to the run configuration
        #[arg(long, default_value = "config.json")]
        config: PathBuf,

        /// Override the number of worker processes
        #[arg(long)]
        workers: Option<usize>,

        /// Override the number of cycles
        #[arg(long)]
        cycles: Option<usize>,

        /// Evaluate segments in this process instead of the pool
        #[arg(long)]
        sequential: bool,
    },

    /// Serve segment tasks over stdin/stdout (started by `run`)
    Worker {
        #[arg(long)]
        step_size: f64,

        #[arg(long)]
        time_step: f64,

        #[arg(long)]
        id: usize,
    },
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

    match Cli::parse().command {
        Commands::Run {
            config,
            workers,
            cycles,
            sequential,
        } => run(config, workers, cycles, sequential),
        Commands::Worker {
            step_size,
            time_step,
            id,
        } => {
            // Ctrl+C reaches the whole process group; the parent decides when we stop
            ctrlc::set_handler(|| {}).context("failed to install Ctrl+C handler")?;
            let runner = SegmentRunner::new(step_size, time_step);
            runner.validate().context("invalid runner settings")?;
            serve_worker(id, runner.segment_fn())
                .with_context(|| format!("worker process {} failed", id))?;
            Ok(())
        }
    }
}

fn run(
    config_path: PathBuf,
    workers: Option<usize>,
    cycles: Option<usize>,
    sequential: bool,
) -> Result<()> {
    let mut config = RunConfig::load_or_default(&config_path);
    if let Some(workers) = workers {
        config.mapper.num_workers = workers;
    }
    if let Some(cycles) = cycles {
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
        sequential,
        "Starting walker simulation"
    );

    let function = config.runner.segment_fn();
    let walkers = config.initial_walkers();
    let report = if sequential {
        Simulation::new(SequentialMapper::new(function), shutdown, config.segment_length)
            .run(walkers, config.num_cycles)
    } else {
        let program = std::env::current_exe().context("cannot locate own executable")?;
        let factory = ProcessWorkerFactory::new(program).arg("worker").args([
            format!("--step-size={}", config.runner.step_size),
            format!("--time-step={}", config.runner.time_step),
        ]);
        Simulation::new(
            WorkerPoolMapper::new(function, config.mapper.clone(), factory),
            shutdown,
            config.segment_length,
        )
        .run(walkers, config.num_cycles)
    }
    .context("simulation failed")?;

    print!("{}", report);
    Ok(())
}
