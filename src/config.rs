//! Service configuration: defaults, limits and validation.
//!
//! The binary fills a [`ServiceConfig`] from its command-line arguments; the
//! library re-checks the ranges so embedders get the same guarantees.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Default number of concurrent workers.
pub const DEFAULT_WORKERS: usize = 4;

/// Maximum allowed number of workers.
pub const MAX_WORKERS: usize = 64;

/// Default bound on outstanding task identifiers.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Maximum allowed queue capacity.
pub const MAX_QUEUE_CAPACITY: usize = 10_000;

/// Default root directory for downloaded content.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Default snapshot file of the task store.
pub const DEFAULT_STORE_PATH: &str = "tasks.json";

/// Default HTTP listen address.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Invalid configuration value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Worker count outside `1..=MAX_WORKERS`.
    #[error("invalid config value for `workers`: {0}. Expected range: 1..={MAX_WORKERS}")]
    Workers(usize),

    /// Queue capacity outside `1..=MAX_QUEUE_CAPACITY`.
    #[error(
        "invalid config value for `queue_capacity`: {0}. Expected range: 1..={MAX_QUEUE_CAPACITY}"
    )]
    QueueCapacity(usize),

    /// Empty path for the data directory or the store snapshot.
    #[error("invalid config value for `{0}`: path must not be empty")]
    EmptyPath(&'static str),
}

/// Runtime settings of the download service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// HTTP listen address.
    pub listen_addr: SocketAddr,
    /// Root directory for downloaded content.
    pub data_dir: PathBuf,
    /// Snapshot file of the task store.
    pub store_path: PathBuf,
    /// Number of concurrent workers.
    pub workers: usize,
    /// Bound on outstanding task identifiers.
    pub queue_capacity: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl ServiceConfig {
    /// Validates values against runtime constraints.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_WORKERS).contains(&self.workers) {
            return Err(ConfigError::Workers(self.workers));
        }
        if !(1..=MAX_QUEUE_CAPACITY).contains(&self.queue_capacity) {
            return Err(ConfigError::QueueCapacity(self.queue_capacity));
        }
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath("data_dir"));
        }
        if self.store_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath("store_path"));
        }
        Ok(())
    }
}
