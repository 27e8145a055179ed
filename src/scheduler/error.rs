//! Error types for the worker pool.

use thiserror::Error;

use crate::config::{MAX_QUEUE_CAPACITY, MAX_WORKERS};

/// Errors returned by [`Scheduler`](super::Scheduler) operations.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Worker count outside the supported range.
    #[error("invalid worker count {value}: must be between 1 and {MAX_WORKERS}")]
    InvalidWorkerCount {
        /// The rejected value.
        value: usize,
    },

    /// Queue capacity outside the supported range.
    #[error("invalid queue capacity {value}: must be between 1 and {MAX_QUEUE_CAPACITY}")]
    InvalidQueueCapacity {
        /// The rejected value.
        value: usize,
    },

    /// An identifier was enqueued after `stop` closed the queue.
    ///
    /// Producers must stop before the pool does; hitting this is a shutdown
    /// ordering bug in the caller.
    #[error("task queue closed, cannot enqueue task {task_id}")]
    QueueClosed {
        /// The identifier that could not be queued.
        task_id: String,
    },
}
