// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by mappers, queues and worker backends
#[derive(Debug, Error)]
pub enum MapperError {
    /// `map()` or `cleanup()` was called outside an `init()`/`cleanup()` window
    #[error("worker pool is not initialized; call init() first")]
    NotInitialized,

    /// `init()` was called twice without an intervening `cleanup()`
    #[error("worker pool is already initialized; call cleanup() before init() again")]
    AlreadyInitialized,

    /// Argument lists passed to `map()` have different lengths
    #[error("argument list {list_index} has {found} elements, expected {expected}")]
    Arity {
        list_index: usize,
        expected: usize,
        found: usize,
    },

    /// A pool was configured with zero workers
    #[error("a worker pool needs at least one worker")]
    NoWorkers,

    /// The backend could not start a worker
    #[error("failed to spawn worker {worker_id}: {source}")]
    Spawn {
        worker_id: usize,
        #[source]
        source: std::io::Error,
    },

    /// The join barrier or the result drain exceeded the configured deadline
    #[error("timed out after {waited:?} with {pending} of {expected} tasks outstanding")]
    WorkerTimeout {
        expected: usize,
        pending: usize,
        waited: Duration,
    },

    /// A worker died from a panic in the task function
    #[error("worker panicked: {message}")]
    WorkerPanicked { message: String },

    /// Every producer on a queue went away while a consumer was waiting
    #[error("all workers disconnected from the {queue} queue")]
    WorkersDisconnected { queue: &'static str },

    /// A queue or worker broke the submission protocol
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A payload could not be encoded or decoded for transfer
    #[error("codec error: {0}")]
    Codec(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl MapperError {
    /// True for the errors that leave the pool in a usable state
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MapperError::NotInitialized
                | MapperError::AlreadyInitialized
                | MapperError::Arity { .. }
        )
    }
}
