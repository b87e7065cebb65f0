//! Change records produced by the diff engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a single path changed between two revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileChangeType {
    Added,
    Modified,
    Deleted,
    Renamed,
}

impl fmt::Display for FileChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileChangeType::Added => write!(f, "added"),
            FileChangeType::Modified => write!(f, "modified"),
            FileChangeType::Deleted => write!(f, "deleted"),
            FileChangeType::Renamed => write!(f, "renamed"),
        }
    }
}

/// One changed path between two revisions.
///
/// Records are built once per comparison by the diff engine and are not
/// modified afterwards. Construct them through [`FileChange::new`] or
/// [`FileChange::renamed`] so that `old_path` is set exactly when the
/// change is a rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    /// Path at the newer revision (older revision for deletions).
    pub file_path: String,
    /// Type of change.
    pub change_type: FileChangeType,
    /// Number of lines added.
    #[serde(default)]
    pub additions: u64,
    /// Number of lines deleted.
    #[serde(default)]
    pub deletions: u64,
    /// Unified diff hunks, possibly truncated.
    pub diff: String,
    /// Previous path, only for renames.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_path: Option<String>,
}

impl FileChange {
    /// Build a non-rename change record.
    ///
    /// A `Renamed` kind passed here is downgraded to `Modified` since no
    /// previous path is known.
    pub fn new(
        file_path: impl Into<String>,
        change_type: FileChangeType,
        additions: u64,
        deletions: u64,
        diff: impl Into<String>,
    ) -> Self {
        let change_type = match change_type {
            FileChangeType::Renamed => FileChangeType::Modified,
            other => other,
        };
        Self {
            file_path: file_path.into(),
            change_type,
            additions,
            deletions,
            diff: diff.into(),
            old_path: None,
        }
    }

    /// Build a rename record from `old_path` to `file_path`.
    pub fn renamed(
        old_path: impl Into<String>,
        file_path: impl Into<String>,
        additions: u64,
        deletions: u64,
        diff: impl Into<String>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            change_type: FileChangeType::Renamed,
            additions,
            deletions,
            diff: diff.into(),
            old_path: Some(old_path.into()),
        }
    }
}

/// Sum of additions and deletions over a set of changes.
pub fn totals(changes: &[FileChange]) -> (u64, u64) {
    changes.iter().fold((0, 0), |(add, del), c| {
        (add + c.additions, del + c.deletions)
    })
}
