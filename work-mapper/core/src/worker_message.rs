// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use serde::{Deserialize, Serialize};

/// Item travelling on the inbound queue from the mapper to the workers
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum QueueItem<T> {
    /// Work tagged with its position in the submitted batch
    Task { sequence_id: usize, task: T },
    /// Tells exactly one worker to leave its loop
    Shutdown,
}

impl<T> QueueItem<T> {
    pub fn is_shutdown(&self) -> bool {
        matches!(self, QueueItem::Shutdown)
    }
}

/// Item travelling on the outbound queue from a worker back to the mapper.
/// Arrival order is completion order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ResultEntry<O> {
    pub sequence_id: usize,
    pub worker_id: usize,
    pub result: O,
}
