// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{MapperError, QueueItem, ResultEntry};

/// Inbound side of a worker: where it pulls work from
pub trait TaskReceiver<T>: Send {
    /// Blocks until the next item is available
    fn recv(&mut self) -> Result<QueueItem<T>, MapperError>;

    /// Marks the most recently received item as processed.
    /// Queues without join accounting can leave this as a no-op.
    fn task_done(&mut self) -> Result<(), MapperError> {
        Ok(())
    }
}

/// Outbound side of a worker: where it pushes results to
pub trait ResultSender<O>: Send {
    fn send(&mut self, entry: ResultEntry<O>) -> Result<(), MapperError>;
}
