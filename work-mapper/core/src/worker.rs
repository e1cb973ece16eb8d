// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{MapperError, QueueItem, ResultEntry, ResultSender, TaskExecutor, TaskReceiver};
use std::marker::PhantomData;
use tracing::{debug, trace};

/// Summary returned when a worker leaves its loop on a shutdown item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerReport {
    pub worker_id: usize,
    pub tasks_completed: usize,
}

/// Receive-execute-send loop shared by every backend.
///
/// The worker only ever talks to its two queues; it never sees another
/// worker's state.
pub struct Worker<T, R, S, E> {
    id: usize,
    inbound: R,
    outbound: S,
    executor: E,
    _task: PhantomData<fn(T)>,
}

impl<T, R, S, E> Worker<T, R, S, E>
where
    R: TaskReceiver<T>,
    E: TaskExecutor<T>,
    S: ResultSender<E::Output>,
{
    pub fn new(id: usize, inbound: R, outbound: S, executor: E) -> Self {
        Self {
            id,
            inbound,
            outbound,
            executor,
            _task: PhantomData,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Runs until a shutdown item arrives.
    ///
    /// An item is marked done only after its result was pushed. If the
    /// executor or a queue fails, the loop returns the error without marking
    /// the item, so a mapper waiting on the join barrier keeps waiting.
    pub fn run(mut self) -> Result<WorkerReport, MapperError> {
        debug!(worker_id = self.id, "Worker started");
        let mut tasks_completed = 0;

        loop {
            match self.inbound.recv()? {
                QueueItem::Shutdown => {
                    self.executor.shutdown()?;
                    self.inbound.task_done()?;
                    break;
                }
                QueueItem::Task { sequence_id, task } => {
                    let result = self.executor.execute(task)?;
                    self.outbound.send(ResultEntry {
                        sequence_id,
                        worker_id: self.id,
                        result,
                    })?;
                    self.inbound.task_done()?;
                    tasks_completed += 1;
                    trace!(worker_id = self.id, sequence_id, "Task completed");
                }
            }
        }

        debug!(worker_id = self.id, tasks_completed, "Worker stopped");
        Ok(WorkerReport {
            worker_id: self.id,
            tasks_completed,
        })
    }
}
