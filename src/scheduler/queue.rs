//! Bounded FIFO of task identifiers with an explicit open/closed state.
//!
//! Producers use [`TaskQueue::try_push`] (never waits) or [`TaskQueue::push`]
//! (waits for capacity). Consumers call [`TaskQueue::pop`], which waits while
//! the queue is open and empty, keeps handing out items after [`close`], and
//! returns `None` only once the queue is both closed and drained.
//!
//! [`close`]: TaskQueue::close

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tokio::sync::Notify;

/// Rejection from [`TaskQueue::try_push`]; hands the identifier back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TryPushError {
    /// The queue is at capacity.
    #[error("task queue is full")]
    Full(String),
    /// The queue no longer accepts identifiers.
    #[error("task queue is closed")]
    Closed(String),
}

/// Rejection from [`TaskQueue::push`]: the queue was closed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("task queue is closed")]
pub struct PushClosedError(pub String);

#[derive(Debug)]
struct QueueState {
    items: VecDeque<String>,
    closed: bool,
}

#[derive(Debug)]
struct Shared {
    capacity: usize,
    state: Mutex<QueueState>,
    /// Signalled when an item arrives or the queue closes.
    not_empty: Notify,
    /// Signalled when an item leaves or the queue closes.
    not_full: Notify,
}

/// Bounded, closable queue of task identifiers. Clones share the same queue.
#[derive(Debug, Clone)]
pub struct TaskQueue {
    shared: Arc<Shared>,
}

impl TaskQueue {
    /// Creates an open queue holding at most `capacity` identifiers.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                capacity,
                state: Mutex::new(QueueState {
                    items: VecDeque::with_capacity(capacity),
                    closed: false,
                }),
                not_empty: Notify::new(),
                not_full: Notify::new(),
            }),
        }
    }

    /// Maximum number of queued identifiers.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Number of identifiers waiting to be taken.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    /// Returns true if no identifiers are waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    /// Returns true once [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Inserts without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`TryPushError::Full`] at capacity and [`TryPushError::Closed`]
    /// after [`close`](Self::close); both carry the identifier back.
    pub fn try_push(&self, task_id: String) -> Result<(), TryPushError> {
        {
            let mut state = self.lock();
            if state.closed {
                return Err(TryPushError::Closed(task_id));
            }
            if state.items.len() >= self.shared.capacity {
                return Err(TryPushError::Full(task_id));
            }
            state.items.push_back(task_id);
        }
        self.shared.not_empty.notify_one();
        Ok(())
    }

    /// Inserts, waiting for free capacity.
    ///
    /// # Errors
    ///
    /// Returns [`PushClosedError`] if the queue is closed before or while
    /// waiting.
    pub async fn push(&self, task_id: String) -> Result<(), PushClosedError> {
        let mut task_id = task_id;
        loop {
            let notified = self.shared.not_full.notified();
            tokio::pin!(notified);
            // Register before inspecting state so a concurrent pop/close can't slip past.
            notified.as_mut().enable();

            match self.try_push(task_id) {
                Ok(()) => return Ok(()),
                Err(TryPushError::Closed(id)) => return Err(PushClosedError(id)),
                Err(TryPushError::Full(id)) => task_id = id,
            }

            notified.await;
        }
    }

    /// Takes the next identifier, waiting while the queue is open and empty.
    ///
    /// Returns `None` once the queue is closed and every queued identifier
    /// has been handed out.
    pub async fn pop(&self) -> Option<String> {
        loop {
            let notified = self.shared.not_empty.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if let Some(task_id) = state.items.pop_front() {
                    drop(state);
                    self.shared.not_full.notify_one();
                    return Some(task_id);
                }
                if state.closed {
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Stops accepting identifiers and wakes every waiter.
    ///
    /// Identifiers already queued are still handed out by [`pop`](Self::pop).
    pub fn close(&self) {
        self.lock().closed = true;
        self.shared.not_empty.notify_waiters();
        self.shared.not_full.notify_waiters();
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        // The state is a plain VecDeque + flag; a panic mid-update can't leave it torn.
        self.shared
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
