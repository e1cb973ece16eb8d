// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{JoinableReceiver, MapperError, ResultQueueSender, Task, WorkerReport};
use std::any::Any;
use std::thread::JoinHandle;

/// A running worker as seen by the pool mapper
pub trait WorkerHandle: Send {
    /// True once the worker's thread or process has exited
    fn is_finished(&self) -> bool;

    /// Waits for the worker to exit
    fn join(self) -> Result<WorkerReport, MapperError>;
}

/// Trait for starting workers bound to the pool's two queues
pub trait WorkerFactory<A, O>: Send {
    type Handle: WorkerHandle;

    fn spawn_worker(
        &mut self,
        worker_id: usize,
        inbound: JoinableReceiver<Task<A, O>>,
        outbound: ResultQueueSender<O>,
    ) -> Result<Self::Handle, MapperError>;
}

impl<F, H, A, O> WorkerFactory<A, O> for F
where
    F: FnMut(usize, JoinableReceiver<Task<A, O>>, ResultQueueSender<O>) -> Result<H, MapperError>
        + Send,
    H: WorkerHandle,
{
    type Handle = H;

    fn spawn_worker(
        &mut self,
        worker_id: usize,
        inbound: JoinableReceiver<Task<A, O>>,
        outbound: ResultQueueSender<O>,
    ) -> Result<H, MapperError> {
        (self)(worker_id, inbound, outbound)
    }
}

impl WorkerHandle for JoinHandle<Result<WorkerReport, MapperError>> {
    fn is_finished(&self) -> bool {
        JoinHandle::is_finished(self)
    }

    fn join(self) -> Result<WorkerReport, MapperError> {
        JoinHandle::join(self).map_err(|payload| MapperError::WorkerPanicked {
            message: panic_message(&*payload),
        })?
    }
}

/// Best-effort text of a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
