// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{MapperError, Task, TaskFn};

/// Decides how a worker turns a dequeued task into a result
pub trait TaskExecutor<T>: Send {
    type Output;

    fn execute(&mut self, task: T) -> Result<Self::Output, MapperError>;

    /// Called once when the worker receives its shutdown item
    fn shutdown(&mut self) -> Result<(), MapperError> {
        Ok(())
    }
}

/// Runs [`Task`]s in the worker's own thread
#[derive(Debug, Clone, Copy, Default)]
pub struct RunTask;

impl<A, O> TaskExecutor<Task<A, O>> for RunTask {
    type Output = O;

    fn execute(&mut self, task: Task<A, O>) -> Result<O, MapperError> {
        Ok(task.run())
    }
}

/// Applies a locally known function to bare arguments.
/// Used where only the arguments crossed into this worker.
pub struct LocalFunction<A, O> {
    function: TaskFn<A, O>,
}

impl<A, O> LocalFunction<A, O> {
    pub fn new(function: TaskFn<A, O>) -> Self {
        Self { function }
    }
}

impl<A, O> TaskExecutor<A> for LocalFunction<A, O>
where
    A: Send,
    O: Send,
{
    type Output = O;

    fn execute(&mut self, args: A) -> Result<O, MapperError> {
        Ok(Task::new(self.function.clone(), args).run())
    }
}
