// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

mod thread_worker_factory;
pub use thread_worker_factory::{ThreadWorkerFactory, ThreadWorkerHandle};

use work_mapper_core::{MapperConfig, TaskFn, WorkerPoolMapper};

/// Pool mapper whose workers are OS threads in this process
pub type ThreadPoolMapper<A, O> = WorkerPoolMapper<A, O, ThreadWorkerFactory>;

pub fn thread_pool_mapper<A, O>(
    function: TaskFn<A, O>,
    config: MapperConfig,
) -> ThreadPoolMapper<A, O>
where
    A: Send + 'static,
    O: Send + 'static,
{
    WorkerPoolMapper::new(function, config, ThreadWorkerFactory::new())
}
