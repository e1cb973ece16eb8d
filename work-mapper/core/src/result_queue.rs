// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{MapperError, ResultEntry, ResultSender};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::time::Instant;

/// Outbound queue. The mapper keeps the only receiver; every worker gets a sender.
pub struct ResultQueue<O> {
    rx: Receiver<ResultEntry<O>>,
}

/// Producer handle of a [`ResultQueue`]
pub struct ResultQueueSender<O> {
    tx: Sender<ResultEntry<O>>,
}

impl<O> Clone for ResultQueueSender<O> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

/// Why [`ResultQueue::get_deadline`] came back empty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultWait {
    TimedOut,
    Disconnected,
}

impl<O> ResultQueue<O> {
    /// Creates the queue and its first sender
    pub fn new() -> (Self, ResultQueueSender<O>) {
        let (tx, rx) = unbounded();
        (Self { rx }, ResultQueueSender { tx })
    }

    /// Blocks for the next result.
    /// Fails once every sender has been dropped and the queue is empty.
    pub fn get(&self) -> Result<ResultEntry<O>, MapperError> {
        self.rx
            .recv()
            .map_err(|_| MapperError::WorkersDisconnected { queue: "result" })
    }

    pub fn get_deadline(&self, deadline: Instant) -> Result<ResultEntry<O>, ResultWait> {
        self.rx.recv_deadline(deadline).map_err(|e| match e {
            RecvTimeoutError::Timeout => ResultWait::TimedOut,
            RecvTimeoutError::Disconnected => ResultWait::Disconnected,
        })
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl<O: Send> ResultSender<O> for ResultQueueSender<O> {
    fn send(&mut self, entry: ResultEntry<O>) -> Result<(), MapperError> {
        self.tx
            .send(entry)
            .map_err(|_| MapperError::WorkersDisconnected { queue: "result" })
    }
}
