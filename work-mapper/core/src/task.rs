// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::fmt;
use std::sync::Arc;

/// Shared, thread-safe task function.
///
/// Values the function needs for every call (the equivalent of keyword
/// arguments fixed at pool construction) are captured by the closure.
pub type TaskFn<A, O> = Arc<dyn Fn(A) -> O + Send + Sync>;

/// Wraps a plain function or closure into a [`TaskFn`]
pub fn task_fn<A, O, F>(function: F) -> TaskFn<A, O>
where
    F: Fn(A) -> O + Send + Sync + 'static,
{
    Arc::new(function)
}

/// One unit of work: a function plus the positional arguments it is applied to.
///
/// `run` consumes the task, so a task executes at most once.
pub struct Task<A, O> {
    function: TaskFn<A, O>,
    args: A,
}

impl<A, O> Task<A, O> {
    pub fn new(function: TaskFn<A, O>, args: A) -> Self {
        Self { function, args }
    }

    pub fn args(&self) -> &A {
        &self.args
    }

    /// Drops the function and hands back the arguments, for backends that
    /// resolve the function on the far side of a process boundary
    pub fn into_args(self) -> A {
        self.args
    }

    /// Applies the function to the stored arguments.
    /// A panic inside the function is not caught here.
    pub fn run(self) -> O {
        (self.function)(self.args)
    }
}

impl<A: fmt::Debug, O> fmt::Debug for Task<A, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").field("args", &self.args).finish_non_exhaustive()
    }
}
