//! HTTP client wrapper for streaming one URL to disk.
//!
//! This module provides the `HttpClient` struct which performs a single
//! transfer into a [`Destination`]: create the task directory, stream the body
//! into the `.part` file, sync it, then rename it onto the final name.

use std::path::Path;

use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};
use url::Url;

use super::destination::Destination;
use super::error::DownloadError;
use crate::user_agent;

/// HTTP client for streaming downloads.
///
/// This client is designed to be created once and shared by all workers,
/// taking advantage of connection pooling. No request or read timeout is
/// configured: a transfer runs until it completes, fails, or the shared
/// cancellation token fires.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a new HTTP client.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent(user_agent::default_download_user_agent())
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Downloads `url` into `destination`, returning the number of bytes written.
    ///
    /// Steps:
    /// 1. Create the per-task directory (an existing directory is fine)
    /// 2. Send the GET request; a non-2xx status fails without touching disk
    /// 3. Stream the body into the `.part` file, truncating any earlier attempt
    /// 4. Sync and rename the `.part` file onto the final name
    ///
    /// A failed transfer leaves its `.part` file behind; the next attempt
    /// overwrites it from byte zero.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if:
    /// - The URL is invalid
    /// - The request or a body read fails
    /// - The server returns a status outside 2xx
    /// - Creating, writing, syncing or renaming a file fails
    /// - `cancel` fires before the transfer completes
    #[instrument(skip(self, destination, cancel), fields(url = %url, file_name = %destination.file_name()))]
    pub async fn download(
        &self,
        url: &str,
        destination: &Destination,
        cancel: &CancellationToken,
    ) -> Result<u64, DownloadError> {
        debug!("starting download");

        fs::create_dir_all(destination.dir())
            .await
            .map_err(|e| DownloadError::io(destination.dir(), e))?;

        Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        if cancel.is_cancelled() {
            return Err(DownloadError::cancelled(url));
        }

        let response = self.send_request(url, cancel).await?;

        let part_path = destination.part_path();
        let file = File::create(&part_path)
            .await
            .map_err(|e| DownloadError::io(&part_path, e))?;

        let bytes_written = stream_to_file(file, response, url, &part_path, cancel).await?;

        let final_path = destination.final_path();
        fs::rename(&part_path, &final_path)
            .await
            .map_err(|e| DownloadError::io(&final_path, e))?;

        info!(
            path = %final_path.display(),
            bytes = bytes_written,
            "download complete"
        );
        Ok(bytes_written)
    }

    async fn send_request(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<reqwest::Response, DownloadError> {
        let response = tokio::select! {
            () = cancel.cancelled() => return Err(DownloadError::cancelled(url)),
            result = self.client.get(url).send() => {
                result.map_err(|e| DownloadError::network(url, e))?
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url, status));
        }

        Ok(response)
    }
}

/// Streams the response body into `file`, racing every chunk against `cancel`.
async fn stream_to_file(
    file: File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
    cancel: &CancellationToken,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    loop {
        let next = tokio::select! {
            () = cancel.cancelled() => return Err(DownloadError::cancelled(url)),
            next = stream.next() => next,
        };
        let Some(chunk_result) = next else {
            break;
        };
        let chunk = chunk_result.map_err(|e| DownloadError::network(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(file_path, e))?;

        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path, e))?;
    // Content must be durable before the rename makes it visible.
    writer
        .get_ref()
        .sync_all()
        .await
        .map_err(|e| DownloadError::io(file_path, e))?;

    Ok(bytes_written)
}
