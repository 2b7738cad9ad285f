//! Per-file change records resolved from a pull request.
//!
//! A change is either fully materialized in memory (patch text plus parsed
//! hunks) or known only by reference (oversized diffs the host refuses to
//! inline). The two cases carry different fields, so they are distinct
//! variants rather than one struct with optional everything.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::diff::DiffHunk;

/// Kind of change a file underwent between base and head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeStatus {
    Added,
    Deleted,
    Modified,
    Renamed,
    Copied,
    Unknown,
}

impl ChangeStatus {
    /// Map a host status string to a status variant.
    ///
    /// Follows the GitHub file-status vocabulary ("removed" means deleted,
    /// "changed" is a type change treated as modified). Unrecognized strings
    /// map to Unknown and reconstruct with the conservative fallback paths.
    pub fn from_host_status(status: &str) -> Self {
        match status {
            "added" => Self::Added,
            "removed" | "deleted" => Self::Deleted,
            "modified" | "changed" => Self::Modified,
            "renamed" => Self::Renamed,
            "copied" => Self::Copied,
            other => {
                warn!(status = other, "unrecognized change status");
                Self::Unknown
            }
        }
    }
}

/// A change whose full diff is known.
#[derive(Debug, Clone)]
pub struct InMemoryChange {
    pub file_name: String,
    /// Present iff the file was renamed (or copied); the base-side name.
    pub previous_file_name: Option<String>,
    pub status: ChangeStatus,
    /// Raw patch text as received from the host.
    pub patch: String,
    /// Hunks parsed from `patch`, in patch order.
    pub hunks: Vec<DiffHunk>,
    /// True when the full pre-image is not retrievable and only the hunks
    /// are authoritative. Reconstruction is then best-effort.
    pub is_partial: bool,
}

/// A change known only by reference; the diff was not materialized.
///
/// Content cannot be reconstructed locally. Hosts fall back to `blob_url`.
#[derive(Debug, Clone)]
pub struct RemoteChange {
    pub file_name: String,
    pub previous_file_name: Option<String>,
    pub status: ChangeStatus,
    pub blob_url: String,
}

#[derive(Debug, Clone)]
pub enum FileChange {
    InMemory(InMemoryChange),
    Remote(RemoteChange),
}

impl FileChange {
    pub fn file_name(&self) -> &str {
        match self {
            Self::InMemory(change) => &change.file_name,
            Self::Remote(change) => &change.file_name,
        }
    }

    pub fn status(&self) -> ChangeStatus {
        match self {
            Self::InMemory(change) => change.status,
            Self::Remote(change) => change.status,
        }
    }

    /// File name on the base side: the previous name for renames and copies.
    pub fn base_path(&self) -> &str {
        let previous = match self {
            Self::InMemory(change) => change.previous_file_name.as_deref(),
            Self::Remote(change) => change.previous_file_name.as_deref(),
        };
        previous.unwrap_or_else(|| self.file_name())
    }

    /// File name on the head side.
    pub fn head_path(&self) -> &str {
        self.file_name()
    }
}
