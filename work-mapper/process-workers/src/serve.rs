// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::wire::{read_frame, write_frame};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::marker::PhantomData;
use tracing::{info, warn};
use work_mapper_core::{
    LocalFunction, MapperError, QueueItem, ResultEntry, ResultSender, TaskFn, TaskReceiver,
    Worker, WorkerReport,
};

/// Task frames read from the parent
pub struct PipeReceiver<R, A> {
    reader: R,
    _args: PhantomData<fn() -> A>,
}

impl<R, A> PipeReceiver<R, A> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            _args: PhantomData,
        }
    }
}

impl<R, A> TaskReceiver<A> for PipeReceiver<R, A>
where
    R: Read + Send,
    A: DeserializeOwned,
{
    fn recv(&mut self) -> Result<QueueItem<A>, MapperError> {
        match read_frame(&mut self.reader)? {
            Some(item) => Ok(item),
            None => {
                // Parent went away without a shutdown item
                warn!("Task stream closed, shutting down");
                Ok(QueueItem::Shutdown)
            }
        }
    }
}

/// Result frames written back to the parent
pub struct PipeSender<W> {
    writer: W,
}

impl<W> PipeSender<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W, O> ResultSender<O> for PipeSender<W>
where
    W: Write + Send,
    O: Serialize,
{
    fn send(&mut self, entry: ResultEntry<O>) -> Result<(), MapperError> {
        write_frame(&mut self.writer, &entry)
    }
}

/// Runs the worker loop over arbitrary streams
pub fn serve<R, W, A, O>(
    worker_id: usize,
    reader: R,
    writer: W,
    function: TaskFn<A, O>,
) -> Result<WorkerReport, MapperError>
where
    R: Read + Send,
    W: Write + Send,
    A: DeserializeOwned + Send,
    O: Serialize + Send,
{
    Worker::new(
        worker_id,
        PipeReceiver::new(reader),
        PipeSender::new(writer),
        LocalFunction::new(function),
    )
    .run()
}

/// Child side of a process worker: tasks on stdin, results on stdout.
/// Anything else this process prints must go to stderr.
pub fn serve_worker<A, O>(
    worker_id: usize,
    function: TaskFn<A, O>,
) -> Result<WorkerReport, MapperError>
where
    A: DeserializeOwned + Send,
    O: Serialize + Send,
{
    info!(worker_id, pid = std::process::id(), "Worker process ready");
    let report = serve(
        worker_id,
        BufReader::new(io::stdin()),
        BufWriter::new(io::stdout()),
        function,
    )?;
    info!(worker_id, tasks_completed = report.tasks_completed, "Worker process done");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use work_mapper_core::task_fn;

    fn requests(items: &[QueueItem<(i32, i32)>]) -> Cursor<Vec<u8>> {
        let mut buffer = Vec::new();
        for item in items {
            write_frame(&mut buffer, item).unwrap();
        }
        Cursor::new(buffer)
    }

    fn responses(bytes: Vec<u8>) -> Vec<ResultEntry<i32>> {
        let mut reader = Cursor::new(bytes);
        let mut entries = Vec::new();
        while let Some(entry) = read_frame(&mut reader).unwrap() {
            entries.push(entry);
        }
        entries
    }

    #[test]
    fn answers_each_request_with_its_sequence_id() {
        let input = requests(&[
            QueueItem::Task { sequence_id: 0, task: (2, 3) },
            QueueItem::Task { sequence_id: 1, task: (4, 5) },
            QueueItem::Shutdown,
            QueueItem::Task { sequence_id: 2, task: (9, 9) },
        ]);
        let mut output = Vec::new();

        let report = serve(5, input, &mut output, task_fn(|(a, b): (i32, i32)| a * b)).unwrap();
        assert_eq!(report.tasks_completed, 2);

        let entries = responses(output);
        assert_eq!(
            entries,
            vec![
                ResultEntry { sequence_id: 0, worker_id: 5, result: 6 },
                ResultEntry { sequence_id: 1, worker_id: 5, result: 20 },
            ]
        );
    }

    #[test]
    fn closed_input_acts_as_shutdown() {
        let input = requests(&[QueueItem::Task { sequence_id: 0, task: (1, 1) }]);
        let mut output = Vec::new();
        let report = serve(0, input, &mut output, task_fn(|(a, b): (i32, i32)| a + b)).unwrap();
        assert_eq!(report.tasks_completed, 1);
        assert_eq!(responses(output).len(), 1);
    }

    #[test]
    fn corrupt_input_stops_the_worker() {
        let mut bytes = 3u32.to_be_bytes().to_vec();
        bytes.extend_from_slice(&[1, 2, 3]);
        let result = serve(
            0,
            Cursor::new(bytes),
            Vec::new(),
            task_fn(|(a, b): (i32, i32)| a + b),
        );
        assert!(matches!(result, Err(MapperError::Codec(_))));
    }
}
