//! Fixed-size worker pool draining a bounded queue of task identifiers.
//!
//! # Overview
//!
//! The [`Scheduler`] owns a [`TaskQueue`] and a configured number of workers.
//! Each worker repeatedly takes one task identifier, reloads the task from the
//! [`Store`], and downloads its files sequentially. Different tasks run in
//! parallel on different workers; a single identifier is only ever delivered
//! to one worker.
//!
//! # Lifecycle
//!
//! 1. [`Scheduler::start`] spawns the workers, bound to one cancellation token
//! 2. [`Scheduler::resume_pending`] re-enqueues unfinished tasks after restart
//! 3. [`Scheduler::enqueue`] is called by producers for new tasks
//! 4. [`Scheduler::stop`] closes the queue and waits for every worker to drain
//!    it and exit
//!
//! Producers must have stopped before `stop` is called; enqueueing into a
//! closed queue returns [`SchedulerError::QueueClosed`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use taskdl_core::{Scheduler, Store};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(Store::open("tasks.json").await?);
//! let scheduler = Scheduler::new(Arc::clone(&store), 4, 100, "data")?;
//! let cancel = CancellationToken::new();
//! scheduler.start(cancel.clone());
//! scheduler.resume_pending().await?;
//! // ... serve requests that call scheduler.enqueue(id) ...
//! scheduler.stop().await;
//! # Ok(())
//! # }
//! ```

mod error;
mod queue;
mod worker;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::config::{MAX_QUEUE_CAPACITY, MAX_WORKERS, ServiceConfig};
use crate::download::HttpClient;
use crate::store::Store;

pub use error::SchedulerError;
pub use queue::{PushClosedError, TaskQueue, TryPushError};

use worker::{WorkerContext, run_worker};

/// Worker pool over a bounded task-identifier queue.
#[derive(Debug)]
pub struct Scheduler {
    store: Arc<Store>,
    queue: TaskQueue,
    worker_count: usize,
    data_dir: PathBuf,
    client: HttpClient,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Scheduler {
    /// Creates a stopped scheduler.
    ///
    /// # Arguments
    ///
    /// * `store` - Shared task store
    /// * `workers` - Number of concurrent workers (1-64)
    /// * `queue_capacity` - Maximum outstanding identifiers (1-10000)
    /// * `data_dir` - Root directory for downloaded content
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidWorkerCount`] or
    /// [`SchedulerError::InvalidQueueCapacity`] for out-of-range values.
    #[instrument(level = "debug", skip(store, data_dir))]
    pub fn new(
        store: Arc<Store>,
        workers: usize,
        queue_capacity: usize,
        data_dir: impl Into<PathBuf>,
    ) -> Result<Self, SchedulerError> {
        if !(1..=MAX_WORKERS).contains(&workers) {
            return Err(SchedulerError::InvalidWorkerCount { value: workers });
        }
        if !(1..=MAX_QUEUE_CAPACITY).contains(&queue_capacity) {
            return Err(SchedulerError::InvalidQueueCapacity {
                value: queue_capacity,
            });
        }

        Ok(Self {
            store,
            queue: TaskQueue::new(queue_capacity),
            worker_count: workers,
            data_dir: data_dir.into(),
            client: HttpClient::new(),
            handles: Mutex::new(Vec::new()),
        })
    }

    /// Creates a scheduler from a validated service configuration.
    ///
    /// # Errors
    ///
    /// Same as [`Scheduler::new`].
    pub fn from_config(store: Arc<Store>, config: &ServiceConfig) -> Result<Self, SchedulerError> {
        Self::new(
            store,
            config.workers,
            config.queue_capacity,
            config.data_dir.clone(),
        )
    }

    /// Returns the task-identifier queue.
    #[must_use]
    pub fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    /// Spawns the workers; every transfer they run observes `cancel`.
    ///
    /// Calling `start` on a running scheduler does nothing.
    pub fn start(&self, cancel: CancellationToken) {
        let mut handles = self.lock_handles();
        if !handles.is_empty() {
            warn!("scheduler already started");
            return;
        }

        let ctx = WorkerContext {
            store: Arc::clone(&self.store),
            queue: self.queue.clone(),
            client: self.client.clone(),
            data_dir: self.data_dir.clone(),
            cancel,
        };
        for worker_id in 0..self.worker_count {
            handles.push(tokio::spawn(run_worker(worker_id, ctx.clone())));
        }
        info!(
            workers = self.worker_count,
            queue_capacity = self.queue.capacity(),
            data_dir = %self.data_dir.display(),
            "scheduler started"
        );
    }

    /// Queues a task identifier for processing.
    ///
    /// Tries a non-blocking insert first; if the queue is full, waits for a
    /// worker to free capacity instead of dropping the task. Callers can
    /// therefore be held up under backpressure.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::QueueClosed`] if [`stop`](Self::stop) has
    /// already closed the queue.
    #[instrument(skip(self, task_id), fields(task_id))]
    pub async fn enqueue(&self, task_id: impl Into<String>) -> Result<(), SchedulerError> {
        let task_id = task_id.into();
        tracing::Span::current().record("task_id", task_id.as_str());

        match self.queue.try_push(task_id) {
            Ok(()) => {
                debug!("task enqueued");
                Ok(())
            }
            Err(TryPushError::Full(task_id)) => {
                debug!(capacity = self.queue.capacity(), "queue full, waiting for capacity");
                self.queue
                    .push(task_id)
                    .await
                    .map_err(|PushClosedError(task_id)| SchedulerError::QueueClosed { task_id })
            }
            Err(TryPushError::Closed(task_id)) => Err(SchedulerError::QueueClosed { task_id }),
        }
    }

    /// Closes the queue and waits until every worker has drained it and exited.
    pub async fn stop(&self) {
        self.queue.close();
        let handles = std::mem::take(&mut *self.lock_handles());
        debug!(workers = handles.len(), "waiting for workers to drain queue");

        for handle in handles {
            // A panicked worker is logged; the remaining workers still drain.
            if let Err(e) = handle.await {
                warn!(error = %e, "worker panicked");
            }
        }
        info!("scheduler stopped");
    }

    /// Enqueues every task that has at least one file not yet `Done`.
    ///
    /// Pending, in-progress and failed files are all retried the same way.
    /// Returns the number of tasks enqueued.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::QueueClosed`] if called after `stop`.
    #[instrument(skip(self))]
    pub async fn resume_pending(&self) -> Result<usize, SchedulerError> {
        let mut resumed = 0;
        for task in self.store.list_tasks().await {
            if task.has_unfinished_files() {
                self.enqueue(task.id).await?;
                resumed += 1;
            }
        }
        info!(resumed, "pending tasks re-enqueued");
        Ok(resumed)
    }

    fn lock_handles(&self) -> std::sync::MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.handles
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
