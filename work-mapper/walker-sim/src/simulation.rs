// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{ShutdownSignal, Walker};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use work_mapper_core::{Mapper, MapperError};

/// Outcome of a simulation run
#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub walkers: Vec<Walker>,
    pub cycles_completed: usize,
    pub elapsed: Duration,
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== WALKER SIMULATION ===")?;
        writeln!(f, "Cycles completed: {}", self.cycles_completed)?;
        for walker in self.walkers.iter().take(10) {
            writeln!(
                f,
                "walker seed={} steps={} time={:.3} displacement={:.4}",
                walker.seed,
                walker.steps,
                walker.time,
                walker.displacement()
            )?;
        }
        if self.walkers.len() > 10 {
            writeln!(f, "... ({} more walkers)", self.walkers.len() - 10)?;
        }
        writeln!(f, "Total time: {:.2}s", self.elapsed.as_secs_f64())
    }
}

/// Drives cycles of segment evaluations through any [`Mapper`].
///
/// Every cycle submits one task per walker. Resampling and boundary
/// conditions are not modelled: each walker simply continues.
pub struct Simulation<M, S> {
    mapper: M,
    shutdown: S,
    segment_length: u32,
}

impl<M, S> Simulation<M, S>
where
    M: Mapper<(Walker, u32), Output = Walker>,
    S: ShutdownSignal,
{
    pub fn new(mapper: M, shutdown: S, segment_length: u32) -> Self {
        Self {
            mapper,
            shutdown,
            segment_length,
        }
    }

    pub fn into_mapper(self) -> M {
        self.mapper
    }

    /// Runs up to `num_cycles` cycles.
    /// The mapper is cleaned up even when a cycle fails.
    pub fn run(
        &mut self,
        walkers: Vec<Walker>,
        num_cycles: usize,
    ) -> Result<SimulationReport, MapperError> {
        let start_time = Instant::now();
        info!(
            walkers = walkers.len(),
            num_cycles,
            segment_length = self.segment_length,
            "Simulation started"
        );

        self.mapper.init()?;
        let outcome = self.run_cycles(walkers, num_cycles);
        let cleanup = self.mapper.cleanup();

        let (walkers, cycles_completed) = outcome?;
        cleanup?;

        let elapsed = start_time.elapsed();
        info!(cycles_completed, elapsed_s = elapsed.as_secs_f64(), "Simulation finished");
        Ok(SimulationReport {
            walkers,
            cycles_completed,
            elapsed,
        })
    }

    fn run_cycles(
        &mut self,
        mut walkers: Vec<Walker>,
        num_cycles: usize,
    ) -> Result<(Vec<Walker>, usize), MapperError> {
        for cycle in 0..num_cycles {
            if self.shutdown.is_cancelled() {
                warn!(cycle, "Shutdown requested, stopping before next cycle");
                return Ok((walkers, cycle));
            }

            let cycle_start = Instant::now();
            let segment_lengths = vec![self.segment_length; walkers.len()];
            walkers = self.mapper.map((walkers, segment_lengths))?;

            let mean_displacement = if walkers.is_empty() {
                0.0
            } else {
                walkers.iter().map(Walker::displacement).sum::<f64>() / walkers.len() as f64
            };
            info!(
                cycle,
                elapsed_ms = cycle_start.elapsed().as_millis() as u64,
                mean_displacement,
                "Cycle complete"
            );
        }
        Ok((walkers, num_cycles))
    }
}
