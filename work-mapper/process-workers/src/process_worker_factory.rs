// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Workers that run in child processes.
//!
//! The pool still sees one worker per slot: a relay thread in this process
//! runs the core worker loop, and its executor forwards each task's
//! arguments to a dedicated child and waits for the reply. The task's
//! function never crosses the process boundary; the child must be started
//! with the same function (see [`crate::serve_worker`]).

use crate::wire::{read_frame, write_frame};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::ffi::OsString;
use std::io::{BufReader, BufWriter};
use std::marker::PhantomData;
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};
use work_mapper_core::{
    JoinableReceiver, MapperError, QueueItem, ResultEntry, ResultQueueSender, Task, TaskExecutor,
    Worker, WorkerFactory, WorkerHandle, WorkerReport,
};

/// Spawns `program args... --id <worker_id>` per worker
#[derive(Debug, Clone)]
pub struct ProcessWorkerFactory {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ProcessWorkerFactory {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    fn command(&self, worker_id: usize) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg("--id")
            .arg(worker_id.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        command
    }
}

impl<A, O> WorkerFactory<A, O> for ProcessWorkerFactory
where
    A: Serialize + Send + 'static,
    O: DeserializeOwned + Send + 'static,
{
    type Handle = ProcessWorkerHandle;

    fn spawn_worker(
        &mut self,
        worker_id: usize,
        inbound: JoinableReceiver<Task<A, O>>,
        outbound: ResultQueueSender<O>,
    ) -> Result<ProcessWorkerHandle, MapperError> {
        let executor = ChildProcessExecutor::spawn(worker_id, self.command(worker_id))?;
        let pid = executor.pid();

        let relay = thread::Builder::new()
            .name(format!("work-mapper-relay-{}", worker_id))
            .spawn(move || Worker::new(worker_id, inbound, outbound, executor).run())
            .map_err(|source| MapperError::Spawn { worker_id, source })?;

        debug!(worker_id, pid, program = %self.program.display(), "Spawned worker process");
        Ok(ProcessWorkerHandle {
            worker_id,
            pid,
            relay,
        })
    }
}

/// Relay thread of one worker process
pub struct ProcessWorkerHandle {
    worker_id: usize,
    pid: u32,
    relay: JoinHandle<Result<WorkerReport, MapperError>>,
}

impl ProcessWorkerHandle {
    pub fn worker_id(&self) -> usize {
        self.worker_id
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }
}

impl WorkerHandle for ProcessWorkerHandle {
    fn is_finished(&self) -> bool {
        self.relay.is_finished()
    }

    fn join(self) -> Result<WorkerReport, MapperError> {
        WorkerHandle::join(self.relay)
    }
}

/// Forwards task arguments to a child process, one request at a time
struct ChildProcessExecutor<A, O> {
    worker_id: usize,
    child: Child,
    stdin: Option<BufWriter<ChildStdin>>,
    stdout: BufReader<ChildStdout>,
    next_request: usize,
    _types: PhantomData<fn(A) -> O>,
}

impl<A, O> ChildProcessExecutor<A, O> {
    fn spawn(worker_id: usize, mut command: Command) -> Result<Self, MapperError> {
        let mut child = command
            .spawn()
            .map_err(|source| MapperError::Spawn { worker_id, source })?;

        let (stdin, stdout) = match (child.stdin.take(), child.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, stdout),
            _ => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(MapperError::ProtocolViolation(format!(
                    "worker process {} started without piped stdio",
                    worker_id
                )));
            }
        };

        Ok(Self {
            worker_id,
            child,
            stdin: Some(BufWriter::new(stdin)),
            stdout: BufReader::new(stdout),
            next_request: 0,
            _types: PhantomData,
        })
    }

    fn pid(&self) -> u32 {
        self.child.id()
    }

    fn stdin(&mut self) -> Result<&mut BufWriter<ChildStdin>, MapperError> {
        let worker_id = self.worker_id;
        self.stdin.as_mut().ok_or_else(|| {
            MapperError::ProtocolViolation(format!(
                "worker process {} already received its shutdown item",
                worker_id
            ))
        })
    }
}

impl<A, O> TaskExecutor<Task<A, O>> for ChildProcessExecutor<A, O>
where
    A: Serialize + Send,
    O: DeserializeOwned + Send,
{
    type Output = O;

    fn execute(&mut self, task: Task<A, O>) -> Result<O, MapperError> {
        let request = self.next_request;
        self.next_request += 1;

        let item = QueueItem::Task {
            sequence_id: request,
            task: task.into_args(),
        };
        write_frame(self.stdin()?, &item)?;

        let entry: ResultEntry<O> = read_frame(&mut self.stdout)?.ok_or_else(|| {
            MapperError::ProtocolViolation(format!(
                "worker process {} exited while running request {}",
                self.worker_id, request
            ))
        })?;
        if entry.sequence_id != request {
            return Err(MapperError::ProtocolViolation(format!(
                "worker process {} answered request {} with {}",
                self.worker_id, request, entry.sequence_id
            )));
        }
        Ok(entry.result)
    }

    fn shutdown(&mut self) -> Result<(), MapperError> {
        if let Some(mut stdin) = self.stdin.take() {
            write_frame(&mut stdin, &QueueItem::<A>::Shutdown)?;
        }

        let status = self.child.wait()?;
        if !status.success() {
            return Err(MapperError::ProtocolViolation(format!(
                "worker process {} exited with {}",
                self.worker_id, status
            )));
        }
        debug!(worker_id = self.worker_id, "Worker process exited");
        Ok(())
    }
}

impl<A, O> Drop for ChildProcessExecutor<A, O> {
    fn drop(&mut self) {
        // Clean exits were already reaped in shutdown()
        if let Ok(None) = self.child.try_wait() {
            warn!(worker_id = self.worker_id, "Killing worker process");
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_appends_worker_id() {
        let factory = ProcessWorkerFactory::new("walker-processes")
            .arg("worker")
            .args(["--step-size", "0.1"]);
        let command = factory.command(4);
        let args: Vec<_> = command.get_args().collect();
        assert_eq!(
            args,
            ["worker", "--step-size", "0.1", "--id", "4"].map(std::ffi::OsStr::new)
        );
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let mut factory = ProcessWorkerFactory::new("/nonexistent/walker-processes");
        let inbound = work_mapper_core::JoinableQueue::<Task<u32, u32>>::new();
        let (_outbound, sender) = work_mapper_core::ResultQueue::new();
        let result =
            WorkerFactory::<u32, u32>::spawn_worker(&mut factory, 0, inbound.receiver(), sender);
        assert!(matches!(
            result,
            Err(MapperError::Spawn { worker_id: 0, .. })
        ));
    }

    #[test]
    fn child_that_exits_early_fails_the_relay() {
        let mut factory = ProcessWorkerFactory::new("/bin/true");
        let inbound = work_mapper_core::JoinableQueue::<Task<u32, u32>>::new();
        let (_outbound, sender) = work_mapper_core::ResultQueue::new();
        let handle =
            WorkerFactory::<u32, u32>::spawn_worker(&mut factory, 1, inbound.receiver(), sender)
                .unwrap();
        assert_eq!(handle.worker_id(), 1);
        assert!(handle.pid() > 0);

        inbound
            .put(QueueItem::Task {
                sequence_id: 0,
                task: Task::new(work_mapper_core::task_fn(|x: u32| x), 5),
            })
            .unwrap();
        assert!(handle.join().is_err());
        assert_eq!(inbound.unfinished(), 1);
    }
}
