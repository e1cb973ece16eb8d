// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

mod walker;
pub use walker::{initial_walkers, Walker};

mod segment_runner;
pub use segment_runner::{SegmentArgs, SegmentRunner};

mod run_config;
pub use run_config::RunConfig;

pub mod shutdown_signal;
pub use shutdown_signal::{AtomicShutdownSignal, NoShutdown, ShutdownSignal};

mod simulation;
pub use simulation::{Simulation, SimulationReport};
