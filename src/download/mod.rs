//! Per-file download operation: streaming HTTP transfer with atomic finalize.
//!
//! This module transfers one URL into `<data_root>/<task_id>/<file_name>`.
//! The body is streamed into `<file_name>.part` and renamed onto the final
//! name only after the whole body has been written and synced, so a partial
//! file is never visible under its final name.
//!
//! The operation knows nothing about task or file state; callers turn the
//! returned byte count or [`DownloadError`] into state transitions.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use taskdl_core::download::{Destination, HttpClient};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new();
//! let url = "https://example.com/paper.pdf";
//! let destination = Destination::resolve(Path::new("./data"), "task-1", url);
//! let bytes = client.download(url, &destination, &CancellationToken::new()).await?;
//! println!("{} bytes -> {}", bytes, destination.final_path().display());
//! # Ok(())
//! # }
//! ```

mod client;
mod constants;
mod destination;
mod error;
mod filename;

pub use client::HttpClient;
pub use constants::{FALLBACK_NAME_PREFIX, PART_SUFFIX};
pub use destination::Destination;
pub use error::DownloadError;
pub use filename::derive_file_name;
