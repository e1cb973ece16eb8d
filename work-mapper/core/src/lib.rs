// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

mod mapper_error;
pub use mapper_error::MapperError;

mod mapper_config;
pub use mapper_config::MapperConfig;

mod task;
pub use task::{task_fn, Task, TaskFn};

mod worker_message;
pub use worker_message::{QueueItem, ResultEntry};

mod worker_io;
pub use worker_io::{ResultSender, TaskReceiver};

mod task_executor;
pub use task_executor::{LocalFunction, RunTask, TaskExecutor};

mod joinable_queue;
pub use joinable_queue::{JoinableQueue, JoinableReceiver};

mod result_queue;
pub use result_queue::{ResultQueue, ResultQueueSender, ResultWait};

mod worker;
pub use worker::{Worker, WorkerReport};

mod worker_factory;
pub use worker_factory::{panic_message, WorkerFactory, WorkerHandle};

mod argument_lists;
pub use argument_lists::{check_arity, ArgumentLists};

mod mapper;
pub use mapper::Mapper;

mod sequential_mapper;
pub use sequential_mapper::SequentialMapper;

mod worker_pool_mapper;
pub use worker_pool_mapper::WorkerPoolMapper;
