//! On-disk location of one file transfer.

use std::path::{Path, PathBuf};

use super::constants::PART_SUFFIX;
use super::filename::derive_file_name;

/// Where a transfer lands: `<data_root>/<task_id>/<file_name>`, streamed
/// through `<file_name>.part` first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    dir: PathBuf,
    file_name: String,
}

impl Destination {
    /// Resolves the destination of `url` within the task's subdirectory.
    ///
    /// Fallback names are time-derived, so resolving the same root-path URL
    /// twice yields different names.
    #[must_use]
    pub fn resolve(data_root: &Path, task_id: &str, url: &str) -> Self {
        Self::new(data_root.join(task_id), derive_file_name(url))
    }

    /// Creates a destination from an explicit directory and file name.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            file_name: file_name.into(),
        }
    }

    /// Per-task directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Derived file name.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Path the completed file is renamed to.
    #[must_use]
    pub fn final_path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }

    /// Path the body is streamed into.
    #[must_use]
    pub fn part_path(&self) -> PathBuf {
        self.dir.join(format!("{}{PART_SUFFIX}", self.file_name))
    }
}
