//! Worker loop: drains task identifiers and drives each file's state machine.

use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::queue::TaskQueue;
use crate::download::{Destination, HttpClient};
use crate::store::Store;
use crate::task::FileState;

/// Everything a worker needs; cloned once per spawned worker.
#[derive(Debug, Clone)]
pub(super) struct WorkerContext {
    pub(super) store: Arc<Store>,
    pub(super) queue: TaskQueue,
    pub(super) client: HttpClient,
    pub(super) data_dir: PathBuf,
    pub(super) cancel: CancellationToken,
}

/// Takes identifiers until the queue is closed and drained.
pub(super) async fn run_worker(worker_id: usize, ctx: WorkerContext) {
    debug!(worker_id, "worker started");
    while let Some(task_id) = ctx.queue.pop().await {
        process_task(&ctx, &task_id).await;
    }
    debug!(worker_id, "worker exiting, queue closed and drained");
}

/// Walks the task's files in order, downloading every file not yet `Done`.
///
/// The task value loaded here is this worker's private working copy; the
/// store only sees it through `update_task`. Failures are recorded per file
/// and never stop the remaining files; after shutdown has begun each
/// remaining file fails fast as cancelled.
#[instrument(skip(ctx), fields(task_id = %task_id))]
pub(super) async fn process_task(ctx: &WorkerContext, task_id: &str) {
    let Some(mut task) = ctx.store.get_task(task_id).await else {
        debug!("task no longer in store, skipping");
        return;
    };

    for index in 0..task.files.len() {
        if task.files[index].is_done() {
            continue;
        }

        let url = task.files[index].url.clone();
        let destination = Destination::resolve(&ctx.data_dir, &task.id, &url);

        task.files[index].begin_attempt(destination.file_name());
        if let Err(e) = ctx.store.update_task(&task).await {
            warn!(file_index = index, error = %e, "failed to persist in-progress state");
            task.files[index].fail(e.to_string());
            if let Err(e) = ctx.store.update_task(&task).await {
                warn!(file_index = index, error = %e, "failed to persist failure");
            }
            continue;
        }
        debug!(file_index = index, url = %url, file_name = %destination.file_name(), "file in progress");

        match ctx.client.download(&url, &destination, &ctx.cancel).await {
            Ok(bytes) => {
                debug!(file_index = index, bytes, "file done");
                task.files[index].complete(bytes);
            }
            Err(e) => {
                warn!(file_index = index, url = %url, error = %e, "file failed");
                task.files[index].fail(e.to_string());
            }
        }

        if let Err(e) = ctx.store.update_task(&task).await {
            warn!(file_index = index, error = %e, "failed to persist file result");
        }
    }

    let done = task
        .files
        .iter()
        .filter(|f| f.state == FileState::Done)
        .count();
    let failed = task
        .files
        .iter()
        .filter(|f| f.state == FileState::Failed)
        .count();
    info!(
        files = task.files.len(),
        done,
        failed,
        "task processed"
    );
}
