// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Inbound queue with join accounting.
//!
//! Every `put` raises an "unfinished" counter and every `task_done` from a
//! receiver lowers it. `join` blocks until the counter is back at zero, which
//! is the barrier the pool mapper waits on after enqueueing a batch.

use crate::{MapperError, QueueItem, TaskReceiver};
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::Instant;

struct JoinState {
    unfinished: Mutex<usize>,
    all_done: Condvar,
}

impl JoinState {
    fn task_done(&self) -> Result<(), MapperError> {
        let mut unfinished = self.unfinished.lock();
        if *unfinished == 0 {
            return Err(MapperError::ProtocolViolation(
                "task_done() called more times than items were put".to_string(),
            ));
        }
        *unfinished -= 1;
        if *unfinished == 0 {
            self.all_done.notify_all();
        }
        Ok(())
    }
}

/// Multi-producer, multi-consumer queue of [`QueueItem`]s that can be joined
pub struct JoinableQueue<T> {
    tx: Sender<QueueItem<T>>,
    rx: Receiver<QueueItem<T>>,
    state: Arc<JoinState>,
}

impl<T> JoinableQueue<T> {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            tx,
            rx,
            state: Arc::new(JoinState {
                unfinished: Mutex::new(0),
                all_done: Condvar::new(),
            }),
        }
    }

    /// Enqueues an item and counts it as unfinished
    pub fn put(&self, item: QueueItem<T>) -> Result<(), MapperError> {
        *self.state.unfinished.lock() += 1;
        if self.tx.send(item).is_err() {
            // Unreachable while `self.rx` is alive, but keep the count honest
            *self.state.unfinished.lock() -= 1;
            return Err(MapperError::WorkersDisconnected { queue: "task" });
        }
        Ok(())
    }

    /// A handle for one worker to pull from
    pub fn receiver(&self) -> JoinableReceiver<T> {
        JoinableReceiver {
            rx: self.rx.clone(),
            state: self.state.clone(),
            received: 0,
        }
    }

    /// Items put but not yet marked done
    pub fn unfinished(&self) -> usize {
        *self.state.unfinished.lock()
    }

    /// Items still sitting in the channel, not yet picked up by any worker
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Blocks until every item put so far has been marked done
    pub fn join(&self) {
        let mut unfinished = self.state.unfinished.lock();
        while *unfinished > 0 {
            self.state.all_done.wait(&mut unfinished);
        }
    }

    /// Like [`join`](Self::join) but gives up at `deadline`.
    /// Returns false if items were still unfinished when the deadline passed.
    pub fn join_deadline(&self, deadline: Instant) -> bool {
        let mut unfinished = self.state.unfinished.lock();
        while *unfinished > 0 {
            if self
                .state
                .all_done
                .wait_until(&mut unfinished, deadline)
                .timed_out()
            {
                return *unfinished == 0;
            }
        }
        true
    }
}

impl<T> Default for JoinableQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Consumer handle of a [`JoinableQueue`], owned by a single worker
pub struct JoinableReceiver<T> {
    rx: Receiver<QueueItem<T>>,
    state: Arc<JoinState>,
    received: usize,
}

impl<T: Send> TaskReceiver<T> for JoinableReceiver<T> {
    fn recv(&mut self) -> Result<QueueItem<T>, MapperError> {
        let item = self
            .rx
            .recv()
            .map_err(|_| MapperError::WorkersDisconnected { queue: "task" })?;
        self.received += 1;
        Ok(item)
    }

    fn task_done(&mut self) -> Result<(), MapperError> {
        if self.received == 0 {
            return Err(MapperError::ProtocolViolation(
                "task_done() called without a received item".to_string(),
            ));
        }
        self.received -= 1;
        self.state.task_done()
    }
}
