// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Order-preserving mapper over a fixed pool of workers.
//!
//! A `map()` call goes through four steps:
//! - every row becomes a [`Task`] tagged with its index and is enqueued
//! - the mapper waits on the inbound queue's join barrier
//! - exactly N results are drained from the outbound queue; the queue is
//!   never closed, so draining "until empty" could stop early or hang
//! - results are slotted back by sequence id and returned in input order
//!
//! Without a drain timeout, a worker that dies mid-task stalls `map()`
//! forever, even when every worker is gone: the join barrier is waited on
//! before the result queue, so its disconnect is never observed. That is a
//! known limitation, not a recovery path.

use crate::{
    ArgumentLists, JoinableQueue, Mapper, MapperConfig, MapperError, QueueItem, ResultQueue,
    ResultWait, Task, TaskFn, WorkerFactory, WorkerHandle,
};
use std::time::Instant;
use tracing::{debug, info, trace, warn};

struct Pool<A, O, H> {
    inbound: JoinableQueue<Task<A, O>>,
    outbound: ResultQueue<O>,
    workers: Vec<H>,
    /// Set when a batch failed after enqueueing; leftovers may still be in flight
    broken: bool,
}

/// Pool mapper generic over how workers are started.
/// The queues and workers exist only between `init()` and `cleanup()`.
pub struct WorkerPoolMapper<A, O, F>
where
    F: WorkerFactory<A, O>,
{
    function: TaskFn<A, O>,
    config: MapperConfig,
    factory: F,
    pool: Option<Pool<A, O, F::Handle>>,
}

impl<A, O, F> WorkerPoolMapper<A, O, F>
where
    F: WorkerFactory<A, O>,
{
    pub fn new(function: TaskFn<A, O>, config: MapperConfig, factory: F) -> Self {
        Self {
            function,
            config,
            factory,
            pool: None,
        }
    }

    pub fn with_workers(function: TaskFn<A, O>, num_workers: usize, factory: F) -> Self {
        Self::new(function, MapperConfig::new(num_workers), factory)
    }

    pub fn num_workers(&self) -> usize {
        self.config.num_workers
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.pool.is_some()
    }

    /// Workers whose thread or process is still running
    pub fn live_workers(&self) -> usize {
        self.pool.as_ref().map_or(0, |pool| {
            pool.workers.iter().filter(|w| !w.is_finished()).count()
        })
    }

    /// Enqueues one shutdown item per worker and waits for all of them to exit
    fn stop_workers(inbound: &JoinableQueue<Task<A, O>>, workers: Vec<F::Handle>) {
        for _ in 0..workers.len() {
            if let Err(e) = inbound.put(QueueItem::Shutdown) {
                warn!(error = %e, "Failed to enqueue shutdown item");
            }
        }

        for (worker_id, worker) in workers.into_iter().enumerate() {
            match worker.join() {
                Ok(report) => debug!(
                    worker_id,
                    tasks_completed = report.tasks_completed,
                    "Worker joined"
                ),
                Err(e) => warn!(worker_id, error = %e, "Worker exited abnormally"),
            }
        }
    }

    fn collect(
        pool: &Pool<A, O, F::Handle>,
        num_tasks: usize,
        deadline: Option<(Instant, Instant)>,
    ) -> Result<Vec<O>, MapperError> {
        // Join barrier: every task has been taken and marked done
        match deadline {
            None => pool.inbound.join(),
            Some((started, at)) => {
                if !pool.inbound.join_deadline(at) {
                    return Err(MapperError::WorkerTimeout {
                        expected: num_tasks,
                        pending: pool.inbound.unfinished(),
                        waited: started.elapsed(),
                    });
                }
            }
        }

        debug!(num_tasks, "Retrieving results");
        let mut slots: Vec<Option<O>> = (0..num_tasks).map(|_| None).collect();

        for received in 0..num_tasks {
            let entry = match deadline {
                None => pool.outbound.get()?,
                Some((started, at)) => pool.outbound.get_deadline(at).map_err(|wait| match wait {
                    ResultWait::TimedOut => MapperError::WorkerTimeout {
                        expected: num_tasks,
                        pending: num_tasks - received,
                        waited: started.elapsed(),
                    },
                    ResultWait::Disconnected => {
                        MapperError::WorkersDisconnected { queue: "result" }
                    }
                })?,
            };

            trace!(
                sequence_id = entry.sequence_id,
                worker_id = entry.worker_id,
                remaining = num_tasks - received - 1,
                "Retrieved result"
            );

            let slot = slots.get_mut(entry.sequence_id).ok_or_else(|| {
                MapperError::ProtocolViolation(format!(
                    "worker {} returned sequence id {} for a batch of {}",
                    entry.worker_id, entry.sequence_id, num_tasks
                ))
            })?;
            if slot.is_some() {
                return Err(MapperError::ProtocolViolation(format!(
                    "sequence id {} returned twice (second time by worker {})",
                    entry.sequence_id, entry.worker_id
                )));
            }
            *slot = Some(entry.result);
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(sequence_id, slot)| {
                slot.ok_or_else(|| {
                    MapperError::ProtocolViolation(format!(
                        "no result for sequence id {}",
                        sequence_id
                    ))
                })
            })
            .collect()
    }
}

impl<A, O, F> Mapper<A> for WorkerPoolMapper<A, O, F>
where
    F: WorkerFactory<A, O>,
{
    type Output = O;

    fn init(&mut self) -> Result<(), MapperError> {
        if self.pool.is_some() {
            return Err(MapperError::AlreadyInitialized);
        }
        self.config.validate()?;

        let inbound = JoinableQueue::new();
        let (outbound, sender) = ResultQueue::new();
        let mut workers = Vec::with_capacity(self.config.num_workers);

        for worker_id in 0..self.config.num_workers {
            match self
                .factory
                .spawn_worker(worker_id, inbound.receiver(), sender.clone())
            {
                Ok(worker) => workers.push(worker),
                Err(e) => {
                    warn!(worker_id, error = %e, "Worker failed to start, stopping the others");
                    Self::stop_workers(&inbound, workers);
                    return Err(e);
                }
            }
        }

        info!(num_workers = workers.len(), "Worker pool started");
        self.pool = Some(Pool {
            inbound,
            outbound,
            workers,
            broken: false,
        });
        Ok(())
    }

    fn map<L>(&mut self, lists: L) -> Result<Vec<O>, MapperError>
    where
        L: ArgumentLists<Row = A>,
    {
        let pool = self.pool.as_mut().ok_or(MapperError::NotInitialized)?;
        if pool.broken {
            return Err(MapperError::ProtocolViolation(
                "a previous batch failed; call cleanup() before mapping again".to_string(),
            ));
        }

        let rows = lists.into_rows()?;
        let num_tasks = rows.len();
        if num_tasks == 0 {
            return Ok(Vec::new());
        }

        let deadline = self.config.drain_timeout().map(|timeout| {
            let started = Instant::now();
            (started, started + timeout)
        });

        debug!(num_tasks, "Enqueueing tasks");
        for (sequence_id, args) in rows.into_iter().enumerate() {
            pool.inbound.put(QueueItem::Task {
                sequence_id,
                task: Task::new(self.function.clone(), args),
            })?;
        }

        let outcome = Self::collect(pool, num_tasks, deadline);
        if outcome.is_err() {
            pool.broken = true;
        }
        outcome
    }

    fn cleanup(&mut self) -> Result<(), MapperError> {
        let Pool {
            inbound,
            outbound,
            workers,
            ..
        } = self.pool.take().ok_or(MapperError::NotInitialized)?;

        let num_workers = workers.len();
        Self::stop_workers(&inbound, workers);
        if !outbound.is_empty() {
            warn!(
                leftover = outbound.len(),
                "Discarding results of an unfinished batch"
            );
        }
        info!(num_workers, "Worker pool stopped");
        Ok(())
    }
}

impl<A, O, F> Drop for WorkerPoolMapper<A, O, F>
where
    F: WorkerFactory<A, O>,
{
    fn drop(&mut self) {
        if self.pool.is_some() {
            if let Err(e) = self.cleanup() {
                warn!(error = %e, "Cleanup on drop failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{task_fn, RunTask, Worker, WorkerReport};
    use std::thread::{self, JoinHandle};

    type Handle = JoinHandle<Result<WorkerReport, MapperError>>;

    fn spawn_thread<A, O>(
        worker_id: usize,
        inbound: crate::JoinableReceiver<Task<A, O>>,
        outbound: crate::ResultQueueSender<O>,
    ) -> Result<Handle, MapperError>
    where
        A: Send + 'static,
        O: Send + 'static,
    {
        Ok(thread::spawn(move || {
            Worker::new(worker_id, inbound, outbound, RunTask).run()
        }))
    }

    #[test]
    fn squares_come_back_in_order() {
        let mut mapper =
            WorkerPoolMapper::with_workers(task_fn(|x: i64| x * x), 3, spawn_thread::<i64, i64>);
        assert_eq!(mapper.num_workers(), 3);
        assert_eq!(mapper.config().drain_timeout(), None);
        mapper.init().unwrap();
        assert_eq!(mapper.live_workers(), 3);
        assert_eq!(
            mapper.map(vec![1, 2, 3, 4, 5]).unwrap(),
            vec![1, 4, 9, 16, 25]
        );
        mapper.cleanup().unwrap();
        assert_eq!(mapper.live_workers(), 0);
    }

    #[test]
    fn map_before_init_fails_fast() {
        let mut mapper =
            WorkerPoolMapper::with_workers(task_fn(|x: u8| x), 2, spawn_thread::<u8, u8>);
        assert!(matches!(
            mapper.map(vec![1, 2]),
            Err(MapperError::NotInitialized)
        ));
    }

    #[test]
    fn zero_workers_cannot_init() {
        let mut mapper =
            WorkerPoolMapper::with_workers(task_fn(|x: u8| x), 0, spawn_thread::<u8, u8>);
        assert!(matches!(mapper.init(), Err(MapperError::NoWorkers)));
        assert!(!mapper.is_initialized());
    }

    #[test]
    fn failed_spawn_stops_already_started_workers() {
        let mut spawned = 0;
        let factory = move |worker_id: usize,
                            inbound: crate::JoinableReceiver<Task<u8, u8>>,
                            outbound: crate::ResultQueueSender<u8>|
              -> Result<Handle, MapperError> {
            spawned += 1;
            if spawned == 3 {
                return Err(MapperError::Spawn {
                    worker_id,
                    source: std::io::Error::new(std::io::ErrorKind::Other, "no more threads"),
                });
            }
            spawn_thread(worker_id, inbound, outbound)
        };

        let mut mapper = WorkerPoolMapper::with_workers(task_fn(|x: u8| x), 4, factory);
        assert!(matches!(
            mapper.init(),
            Err(MapperError::Spawn { worker_id: 2, .. })
        ));
        assert!(!mapper.is_initialized());
    }
}
