// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{ArgumentLists, Mapper, MapperError, Task, TaskFn};

/// Runs every task on the caller's thread, in input order.
/// Reference behavior for the pool mappers.
pub struct SequentialMapper<A, O> {
    function: TaskFn<A, O>,
}

impl<A, O> SequentialMapper<A, O> {
    pub fn new(function: TaskFn<A, O>) -> Self {
        Self { function }
    }
}

impl<A, O> Clone for SequentialMapper<A, O> {
    fn clone(&self) -> Self {
        Self {
            function: self.function.clone(),
        }
    }
}

impl<A, O> Mapper<A> for SequentialMapper<A, O> {
    type Output = O;

    fn init(&mut self) -> Result<(), MapperError> {
        Ok(())
    }

    fn map<L>(&mut self, lists: L) -> Result<Vec<O>, MapperError>
    where
        L: ArgumentLists<Row = A>,
    {
        Ok(lists
            .into_rows()?
            .into_iter()
            .map(|args| Task::new(self.function.clone(), args).run())
            .collect())
    }

    fn cleanup(&mut self) -> Result<(), MapperError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task_fn;

    #[test]
    fn maps_in_input_order() {
        let mut mapper = SequentialMapper::new(task_fn(|x: i32| x * x));
        mapper.init().unwrap();
        assert_eq!(mapper.map(vec![1, 2, 3, 4, 5]).unwrap(), vec![1, 4, 9, 16, 25]);
        mapper.cleanup().unwrap();
    }

    #[test]
    fn works_without_init() {
        let mut mapper = SequentialMapper::new(task_fn(|(a, b): (i32, i32)| a - b));
        assert_eq!(mapper.map((vec![5, 7], vec![1, 2])).unwrap(), vec![4, 5]);
    }

    #[test]
    fn arity_error_runs_nothing() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut mapper = SequentialMapper::new(task_fn(move |(a, _b): (i32, i32)| {
            counter.fetch_add(1, Ordering::SeqCst);
            a
        }));

        let result = mapper.map((vec![1, 2, 3], vec![1]));
        assert!(matches!(result, Err(MapperError::Arity { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
