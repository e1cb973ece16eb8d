// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

pub mod wire;

mod process_worker_factory;
pub use process_worker_factory::{ProcessWorkerFactory, ProcessWorkerHandle};

mod serve;
pub use serve::{serve, serve_worker, PipeReceiver, PipeSender};

use work_mapper_core::WorkerPoolMapper;

/// Pool mapper whose workers are child processes
pub type ProcessPoolMapper<A, O> = WorkerPoolMapper<A, O, ProcessWorkerFactory>;
