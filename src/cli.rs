//! CLI argument definitions using clap derive macros.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use taskdl_core::ServiceConfig;
use taskdl_core::config::{
    DEFAULT_DATA_DIR, DEFAULT_LISTEN_ADDR, DEFAULT_QUEUE_CAPACITY, DEFAULT_STORE_PATH,
    DEFAULT_WORKERS,
};

/// Batch URL download service with crash-safe task persistence.
///
/// Accepts tasks (lists of URLs) over HTTP, downloads every file into a
/// per-task directory, and resumes unfinished work after a restart.
#[derive(Parser, Debug)]
#[command(name = "taskdl")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Address the HTTP API listens on
    #[arg(long, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen: SocketAddr,

    /// Root directory for downloaded files (one subdirectory per task)
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Task store snapshot file
    #[arg(long = "store", default_value = DEFAULT_STORE_PATH)]
    pub store_path: PathBuf,

    /// Number of concurrent download workers (1-64)
    #[arg(short = 'w', long, default_value_t = DEFAULT_WORKERS as u8, value_parser = clap::value_parser!(u8).range(1..=64))]
    pub workers: u8,

    /// Maximum number of queued tasks before submissions wait (1-10000)
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY as u16, value_parser = clap::value_parser!(u16).range(1..=10000))]
    pub queue_capacity: u16,
}

impl Args {
    /// Converts the parsed arguments into the service configuration.
    pub fn to_config(&self) -> ServiceConfig {
        ServiceConfig {
            listen_addr: self.listen,
            data_dir: self.data_dir.clone(),
            store_path: self.store_path.clone(),
            workers: usize::from(self.workers),
            queue_capacity: usize::from(self.queue_capacity),
        }
    }

    /// Default log level when `RUST_LOG` is unset.
    pub fn default_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }
}
