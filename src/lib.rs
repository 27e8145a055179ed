//! Task Downloader Core Library
//!
//! This library provides the core of a batch download service: callers submit
//! tasks (ordered lists of URLs), a fixed pool of workers downloads every file
//! into a per-task directory, and all progress is persisted so interrupted
//! work resumes after a restart.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`task`] - Task and file records plus the per-file state machine
//! - [`store`] - Durable task table with crash-consistent snapshot writes
//! - [`download`] - Streaming HTTP transfer with atomic `.part` finalize
//! - [`scheduler`] - Bounded task queue and fixed-size worker pool
//! - [`api`] - HTTP request layer over the store and scheduler
//! - [`config`] - Service configuration defaults and validation

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod config;
pub mod download;
pub mod scheduler;
pub mod shutdown;
pub mod store;
pub mod task;
mod user_agent;

// Re-export commonly used types
pub use config::{ConfigError, DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKERS, ServiceConfig};
pub use download::{Destination, DownloadError, HttpClient};
pub use scheduler::{Scheduler, SchedulerError, TaskQueue};
pub use store::{Store, StoreError};
pub use task::{FileEntry, FileState, Task, generate_task_id};
