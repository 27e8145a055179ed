//! Task and file records and the per-file download state machine.
//!
//! A [`Task`] is an ordered batch of [`FileEntry`] values. Workers mutate the
//! entries in place through the transition helpers below; the task itself is
//! created once by the request layer and never reordered.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of random bytes in a generated task identifier.
const TASK_ID_BYTES: usize = 12;

/// Download state of a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileState {
    /// Never picked up by a worker.
    Pending,
    /// A worker is currently transferring the file.
    InProgress,
    /// Transfer finished and the file sits under its final name.
    Done,
    /// Last attempt failed; retried on the next pass.
    Failed,
}

/// One URL within a task and its download progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Source URL.
    pub url: String,
    /// Destination file name, empty until the first attempt.
    #[serde(default)]
    pub file_name: String,
    /// Current state.
    pub state: FileState,
    /// Message of the last failed attempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Bytes transferred by the last successful attempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

impl FileEntry {
    /// Creates a pending entry for a URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            file_name: String::new(),
            state: FileState::Pending,
            error: None,
            size_bytes: None,
        }
    }

    /// Returns true if the file is finished and should be skipped.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.state == FileState::Done
    }

    /// Starts a new attempt: `InProgress`, prior error cleared.
    pub fn begin_attempt(&mut self, file_name: impl Into<String>) {
        self.file_name = file_name.into();
        self.state = FileState::InProgress;
        self.error = None;
    }

    /// Records a successful transfer.
    pub fn complete(&mut self, size_bytes: u64) {
        self.state = FileState::Done;
        self.size_bytes = Some(size_bytes);
    }

    /// Records a failed attempt, overwriting any previous message.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.state = FileState::Failed;
        self.error = Some(error.into());
    }
}

/// A user-submitted batch of URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Opaque unique identifier.
    pub id: String,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Files in processing order.
    pub files: Vec<FileEntry>,
}

impl Task {
    /// Creates a task with one pending entry per URL, in the given order.
    ///
    /// An empty `name` is stored as absent.
    #[must_use]
    pub fn new<I, S>(id: impl Into<String>, name: Option<String>, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.filter(|n| !n.is_empty()),
            created_at: Utc::now(),
            files: urls.into_iter().map(FileEntry::new).collect(),
        }
    }

    /// Returns true if at least one file still needs processing.
    #[must_use]
    pub fn has_unfinished_files(&self) -> bool {
        self.files.iter().any(|f| !f.is_done())
    }
}

/// Generates a fresh task identifier (24 lowercase hex characters).
#[must_use]
pub fn generate_task_id() -> String {
    let bytes: [u8; TASK_ID_BYTES] = rand::thread_rng().r#gen();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_file_state_serializes_snake_case() {
        let json = serde_json::to_string(&FileState::InProgress).unwrap();
        assert_eq!(json, r#""in_progress""#);
        let parsed: FileState = serde_json::from_str(r#""failed""#).unwrap();
        assert_eq!(parsed, FileState::Failed);
    }

    #[test]
    fn test_task_new_preserves_url_order_and_starts_pending() {
        let task = Task::new("t1", None, ["https://a/1", "https://a/2", "https://a/3"]);
        let urls: Vec<_> = task.files.iter().map(|f| f.url.as_str()).collect();
        assert_eq!(urls, ["https://a/1", "https://a/2", "https://a/3"]);
        assert!(task.files.iter().all(|f| f.state == FileState::Pending));
        assert!(task.files.iter().all(|f| f.file_name.is_empty()));
    }

    #[test]
    fn test_task_new_drops_empty_name() {
        let task = Task::new("t1", Some(String::new()), ["https://a/1"]);
        assert_eq!(task.name, None);
        let task = Task::new("t1", Some("papers".to_string()), ["https://a/1"]);
        assert_eq!(task.name.as_deref(), Some("papers"));
    }

    #[test]
    fn test_begin_attempt_clears_error() {
        let mut entry = FileEntry::new("https://a/1");
        entry.fail("HTTP 500");
        entry.begin_attempt("1");
        assert_eq!(entry.state, FileState::InProgress);
        assert_eq!(entry.error, None);
        assert_eq!(entry.file_name, "1");
    }

    #[test]
    fn test_fail_overwrites_previous_error() {
        let mut entry = FileEntry::new("https://a/1");
        entry.fail("first");
        entry.fail("second");
        assert_eq!(entry.error.as_deref(), Some("second"));
        assert_eq!(entry.state, FileState::Failed);
    }

    #[test]
    fn test_has_unfinished_files() {
        let mut task = Task::new("t1", None, ["https://a/1", "https://a/2"]);
        assert!(task.has_unfinished_files());
        task.files[0].complete(10);
        assert!(task.has_unfinished_files());
        task.files[1].complete(20);
        assert!(!task.has_unfinished_files());
    }

    #[test]
    fn test_file_entry_omits_absent_optionals() {
        let entry = FileEntry::new("https://a/1");
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("error").is_none());
        assert!(json.get("size_bytes").is_none());
        assert_eq!(json["state"], "pending");
        assert_eq!(json["file_name"], "");
    }

    #[test]
    fn test_generate_task_id_is_hex_and_unique() {
        let a = generate_task_id();
        let b = generate_task_id();
        assert_eq!(a.len(), 24);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(a, b);
    }
}
