// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::thread::{self, JoinHandle};
use tracing::debug;
use work_mapper_core::{
    JoinableReceiver, MapperError, ResultQueueSender, RunTask, Task, Worker, WorkerFactory,
    WorkerHandle, WorkerReport,
};

/// Starts each worker on a named OS thread running the core worker loop
#[derive(Debug, Clone)]
pub struct ThreadWorkerFactory {
    name_prefix: String,
    stack_size: Option<usize>,
}

impl Default for ThreadWorkerFactory {
    fn default() -> Self {
        Self {
            name_prefix: "work-mapper-worker".to_string(),
            stack_size: None,
        }
    }
}

impl ThreadWorkerFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = prefix.into();
        self
    }

    pub fn with_stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    pub fn thread_name(&self, worker_id: usize) -> String {
        format!("{}-{}", self.name_prefix, worker_id)
    }
}

impl<A, O> WorkerFactory<A, O> for ThreadWorkerFactory
where
    A: Send + 'static,
    O: Send + 'static,
{
    type Handle = ThreadWorkerHandle;

    fn spawn_worker(
        &mut self,
        worker_id: usize,
        inbound: JoinableReceiver<Task<A, O>>,
        outbound: ResultQueueSender<O>,
    ) -> Result<ThreadWorkerHandle, MapperError> {
        let name = self.thread_name(worker_id);
        let mut builder = thread::Builder::new().name(name.clone());
        if let Some(bytes) = self.stack_size {
            builder = builder.stack_size(bytes);
        }

        let handle = builder
            .spawn(move || Worker::new(worker_id, inbound, outbound, RunTask).run())
            .map_err(|source| MapperError::Spawn { worker_id, source })?;

        debug!(worker_id, thread = %name, "Spawned worker thread");
        Ok(ThreadWorkerHandle { worker_id, handle })
    }
}

/// Join handle of one worker thread
pub struct ThreadWorkerHandle {
    worker_id: usize,
    handle: JoinHandle<Result<WorkerReport, MapperError>>,
}

impl ThreadWorkerHandle {
    pub fn worker_id(&self) -> usize {
        self.worker_id
    }
}

impl WorkerHandle for ThreadWorkerHandle {
    fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    fn join(self) -> Result<WorkerReport, MapperError> {
        WorkerHandle::join(self.handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use work_mapper_core::{task_fn, JoinableQueue, QueueItem, ResultQueue};

    #[test]
    fn thread_names_carry_the_worker_id() {
        let factory = ThreadWorkerFactory::new().with_name_prefix("walker");
        assert_eq!(factory.thread_name(3), "walker-3");
    }

    #[test]
    fn spawned_worker_runs_until_shutdown() {
        let mut factory = ThreadWorkerFactory::new().with_stack_size(256 * 1024);
        let inbound = JoinableQueue::new();
        let (outbound, sender) = ResultQueue::new();

        let handle = factory
            .spawn_worker(7, inbound.receiver(), sender)
            .unwrap();
        assert_eq!(handle.worker_id(), 7);

        let double = task_fn(|x: i32| x * 2);
        inbound
            .put(QueueItem::Task {
                sequence_id: 0,
                task: Task::new(double, 21),
            })
            .unwrap();
        inbound.put(QueueItem::Shutdown).unwrap();

        let report = handle.join().unwrap();
        assert_eq!(report.worker_id, 7);
        assert_eq!(report.tasks_completed, 1);

        let entry = outbound.get().unwrap();
        assert_eq!((entry.sequence_id, entry.worker_id, entry.result), (0, 7, 42));
    }
}
