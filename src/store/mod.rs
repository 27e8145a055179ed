//! Durable task table backed by a JSON snapshot file.
//!
//! The [`Store`] owns the authoritative in-memory table and rewrites the whole
//! table to disk on every mutation.
//!
//! # Persistence
//!
//! Every save serializes the full table into `<snapshot>.tmp` in the same
//! directory, syncs it, and renames it over the snapshot. The file on disk is
//! therefore always either the previous complete snapshot or the new one.
//!
//! # Concurrency
//!
//! One exclusive lock covers both the table mutation and the disk write that
//! follows it, so every state transition in the process serializes against
//! every other. A failed save does not roll back the in-memory change; the
//! disk catches up on the next successful save.
//!
//! # Example
//!
//! ```no_run
//! use taskdl_core::store::Store;
//! use taskdl_core::task::Task;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Store::open("tasks.json").await?;
//! store.add_task(Task::new("abc", None, ["https://example.com/a.pdf"])).await?;
//! assert!(store.get_task("abc").await.is_some());
//! # Ok(())
//! # }
//! ```

mod error;

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::task::Task;

pub use error::StoreError;

/// Suffix appended to the snapshot path for the in-flight write.
const TEMP_SUFFIX: &str = ".tmp";

/// Task table keyed by task identifier.
type TaskTable = HashMap<String, Task>;

/// Durable mapping from task identifier to task record.
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    temp_path: PathBuf,
    tasks: Mutex<TaskTable>,
}

impl Store {
    /// Opens the store, loading the snapshot at `path`.
    ///
    /// A missing or empty snapshot yields an empty table. The parent directory
    /// is created if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the snapshot exists but cannot be read,
    /// or [`StoreError::Parse`] if its content is not a valid task table.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }

        let tasks = load_snapshot(&path).await?;
        info!(tasks = tasks.len(), "task store opened");

        Ok(Self {
            temp_path: temp_path_for(&path),
            path,
            tasks: Mutex::new(tasks),
        })
    }

    /// Inserts a new task and persists the table.
    ///
    /// # Errors
    ///
    /// Returns the persistence error. The task stays in the in-memory table
    /// even when the save fails.
    #[instrument(skip(self, task), fields(task_id = %task.id))]
    pub async fn add_task(&self, task: Task) -> Result<(), StoreError> {
        let mut tasks = self.tasks.lock().await;
        tasks.insert(task.id.clone(), task);
        self.persist(&tasks).await
    }

    /// Replaces the task with the same identifier and persists the table.
    ///
    /// A task not yet in the table is inserted.
    ///
    /// # Errors
    ///
    /// Returns the persistence error. The replacement is kept in memory even
    /// when the save fails.
    #[instrument(level = "debug", skip(self, task), fields(task_id = %task.id))]
    pub async fn update_task(&self, task: &Task) -> Result<(), StoreError> {
        let mut tasks = self.tasks.lock().await;
        tasks.insert(task.id.clone(), task.clone());
        self.persist(&tasks).await
    }

    /// Returns a copy of the task, or `None` if the identifier is unknown.
    pub async fn get_task(&self, id: &str) -> Option<Task> {
        self.tasks.lock().await.get(id).cloned()
    }

    /// Returns copies of all tasks, in no particular order.
    pub async fn list_tasks(&self) -> Vec<Task> {
        self.tasks.lock().await.values().cloned().collect()
    }

    /// Returns the number of tasks in the table.
    pub async fn len(&self) -> usize {
        self.tasks.lock().await.len()
    }

    /// Returns true if the table holds no tasks.
    pub async fn is_empty(&self) -> bool {
        self.tasks.lock().await.is_empty()
    }

    /// Writes a final snapshot of the table.
    ///
    /// # Errors
    ///
    /// Returns the persistence error if the final save fails.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn close(&self) -> Result<(), StoreError> {
        let tasks = self.tasks.lock().await;
        self.persist(&tasks).await?;
        info!(tasks = tasks.len(), "task store closed");
        Ok(())
    }

    /// Serializes the table to the temp file and renames it over the snapshot.
    ///
    /// Callers hold the table lock for the whole call.
    async fn persist(&self, tasks: &TaskTable) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(tasks).map_err(StoreError::Serialize)?;

        let mut file = fs::File::create(&self.temp_path)
            .await
            .map_err(|e| StoreError::io(&self.temp_path, e))?;
        file.write_all(&bytes)
            .await
            .map_err(|e| StoreError::io(&self.temp_path, e))?;
        file.sync_all()
            .await
            .map_err(|e| StoreError::io(&self.temp_path, e))?;
        drop(file);

        fs::rename(&self.temp_path, &self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;

        debug!(tasks = tasks.len(), bytes = bytes.len(), "snapshot written");
        Ok(())
    }
}

/// Reads the snapshot at `path`; missing or blank files are an empty table.
async fn load_snapshot(path: &Path) -> Result<TaskTable, StoreError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("no snapshot found, starting empty");
            return Ok(TaskTable::new());
        }
        Err(e) => return Err(StoreError::io(path, e)),
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(TaskTable::new());
    }

    serde_json::from_slice(&bytes).map_err(|e| StoreError::parse(path, e))
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}
