//! External change source seam.
//!
//! Retrieval of raw diffs, file lists, review comments, and blobs is the
//! host's responsibility; this crate consumes them through [`ChangeSource`].
//! Implementations typically wrap a hosting API client or a local working
//! copy. A single fetch failure surfaces as a [`FetchError`]; retry and
//! backoff policy belong to the implementation, not to this crate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("change source unavailable: {0}")]
    Unavailable(String),
    #[error("file not found: {path} at {commit}")]
    NotFound { path: String, commit: String },
    #[error("malformed response from change source: {0}")]
    Malformed(String),
}

/// One changed file as reported by the host, before parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFileChange {
    pub file_name: String,
    #[serde(default)]
    pub previous_file_name: Option<String>,
    /// Host status string ("added", "removed", "modified", ...)
    pub status: String,
    /// Unified diff for this file; None when the host declined to inline it
    /// (oversized diffs).
    #[serde(default)]
    pub patch: Option<String>,
    /// True when the patch covers only part of the change.
    #[serde(default)]
    pub is_partial: bool,
    #[serde(default)]
    pub blob_url: Option<String>,
}

/// Change-set metadata for one pull request view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeInfo {
    /// Common ancestor the diff was computed against. Absent when the host
    /// could not determine one; resolution then yields an empty change set.
    pub merge_base: Option<String>,
    pub head_commit: String,
    pub files: Vec<RawFileChange>,
}

/// A review comment anchored to a patch position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewComment {
    pub id: u64,
    pub path: String,
    pub position: Option<u32>,
    pub body: String,
    pub author: String,
    #[serde(default)]
    pub is_draft: bool,
}

/// Async access to the pull request's raw data.
#[async_trait]
pub trait ChangeSource: Send + Sync {
    /// Fetch the change list and commit metadata.
    async fn change_info(&self) -> Result<ChangeInfo, FetchError>;

    /// Fetch the review comments, in host order.
    async fn review_comments(&self) -> Result<Vec<ReviewComment>, FetchError>;

    /// Fetch a file's full content at a commit.
    async fn file_at(&self, path: &str, commit: &str) -> Result<String, FetchError>;
}
