//! Change-set resolution and the virtual document surface.
//!
//! A [`ReviewSession`] owns everything derived from one pull request view:
//! the resolved change records, their issued address tokens, and the
//! associated review comments. `open` performs resolution and registration
//! in one step and returns the handle; there is no lazily-initialized
//! state. Re-resolving fully replaces the record set, so tokens issued
//! against an earlier resolution decode structurally but miss lookup and
//! degrade to "content unavailable".

use tracing::{debug, warn};

use crate::address::{self, Address};
use crate::change::{ChangeStatus, FileChange, InMemoryChange, RemoteChange};
use crate::config::Config;
use crate::content::{self, Side};
use crate::diff;
use crate::ranges::{self, LineRange};
use crate::source::{ChangeSource, FetchError, RawFileChange, ReviewComment};

/// One change record paired with its issued addresses and comments.
#[derive(Debug, Clone)]
pub struct ResolvedChange {
    pub change: FileChange,
    pub base_address: String,
    pub head_address: String,
    pub comments: Vec<ReviewComment>,
}

/// State transitions delivered to the session by the host.
///
/// Draft-state changes re-derive the affected records through a full
/// re-resolve instead of flipping flags on live comment objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    DraftStateCleared,
}

pub struct ReviewSession<S: ChangeSource> {
    source: S,
    config: Config,
    base_commit: String,
    head_commit: String,
    changes: Vec<ResolvedChange>,
    generation: u64,
}

impl<S: ChangeSource> ReviewSession<S> {
    /// Open a session: resolve the change set and register the records.
    ///
    /// A missing merge base is a defined degenerate case and produces an
    /// open session with an empty change set, not an error.
    pub async fn open(source: S, config: Config) -> Result<Self, FetchError> {
        let mut session = Self {
            source,
            config,
            base_commit: String::new(),
            head_commit: String::new(),
            changes: Vec::new(),
            generation: 0,
        };
        session.resolve().await?;
        Ok(session)
    }

    /// Re-resolve the change set from the source.
    ///
    /// The previous record set is fully replaced, never merged. Taking
    /// `&mut self` makes a second resolve wait for the first, so the last
    /// completed resolve always wins.
    pub async fn resolve(&mut self) -> Result<(), FetchError> {
        let (info, comments) = tokio::try_join!(
            self.source.change_info(),
            self.source.review_comments()
        )?;
        self.generation += 1;

        let Some(merge_base) = info.merge_base else {
            debug!(
                generation = self.generation,
                "no merge base; resolving to empty change set"
            );
            self.base_commit = String::new();
            self.head_commit = info.head_commit;
            self.changes = Vec::new();
            return Ok(());
        };

        self.base_commit = merge_base;
        self.head_commit = info.head_commit;

        let mut changes = Vec::with_capacity(info.files.len());
        for raw in info.files {
            let change = parse_raw_change(raw);
            let (base_address, head_address) = self.addresses_for(&change);
            let comments: Vec<ReviewComment> = comments
                .iter()
                .filter(|comment| comment.path == change.file_name())
                .cloned()
                .collect();
            changes.push(ResolvedChange {
                change,
                base_address,
                head_address,
                comments,
            });
        }

        debug!(
            generation = self.generation,
            files = changes.len(),
            "resolved change set"
        );
        self.changes = changes;
        Ok(())
    }

    pub async fn handle_event(&mut self, event: SessionEvent) -> Result<(), FetchError> {
        match event {
            SessionEvent::DraftStateCleared => self.resolve().await,
        }
    }

    pub fn changes(&self) -> &[ResolvedChange] {
        &self.changes
    }

    pub fn base_commit(&self) -> &str {
        &self.base_commit
    }

    pub fn head_commit(&self) -> &str {
        &self.head_commit
    }

    fn addresses_for(&self, change: &FileChange) -> (String, String) {
        let base = Address {
            file_name: change.base_path().to_string(),
            side: Side::Base,
            base_commit: self.base_commit.clone(),
            head_commit: self.head_commit.clone(),
            status: change.status(),
        };
        let head = Address {
            file_name: change.head_path().to_string(),
            side: Side::Head,
            base_commit: self.base_commit.clone(),
            head_commit: self.head_commit.clone(),
            status: change.status(),
        };
        (address::encode(&base), address::encode(&head))
    }

    /// Find the record a decoded address refers to. Misses on commit-pair
    /// mismatch (stale token from an earlier resolution).
    fn lookup(&self, address: &Address) -> Option<&ResolvedChange> {
        if address.base_commit != self.base_commit || address.head_commit != self.head_commit {
            debug!(file = %address.file_name, "stale address token; lookup miss");
            return None;
        }
        self.changes.iter().find(|resolved| {
            let change = &resolved.change;
            if change.status() != address.status {
                return false;
            }
            match address.side {
                Side::Base => change.base_path() == address.file_name,
                Side::Head => change.head_path() == address.file_name,
            }
        })
    }

    /// Produce the document text for a previously issued address token.
    ///
    /// `None` means content is unavailable here: undecodable or stale
    /// token, or a change whose diff was never materialized; the host falls
    /// back to its remote view. Fetch failures for the original content do
    /// not propagate; they degrade to hunk-only reconstruction.
    pub async fn provide_document_content(&self, token: &str) -> Option<String> {
        let address = address::decode(token)?;
        let resolved = self.lookup(&address)?;
        match &resolved.change {
            FileChange::Remote(remote) => {
                debug!(
                    file = %remote.file_name,
                    blob_url = %remote.blob_url,
                    "diff not materialized; deferring to remote view"
                );
                None
            }
            FileChange::InMemory(change) => {
                let original = self.fetch_original(change).await;
                Some(content::reconstruct(change, address.side, original.as_deref()))
            }
        }
    }

    /// Commentable ranges for a previously issued address token.
    ///
    /// `None` signals "not applicable to this document" (stale or
    /// undecodable tokens, and remote changes without hunks).
    pub fn provide_commenting_ranges(&self, token: &str) -> Option<Vec<LineRange>> {
        let address = address::decode(token)?;
        let resolved = self.lookup(&address)?;
        match &resolved.change {
            FileChange::Remote(_) => None,
            FileChange::InMemory(change) => {
                let ranges = ranges::commenting_ranges(&change.hunks, address.side);
                Some(if self.config.ranges.coalesce {
                    ranges::coalesce(ranges)
                } else {
                    ranges
                })
            }
        }
    }

    /// Fetch the base-side original when the decision table needs it.
    async fn fetch_original(&self, change: &InMemoryChange) -> Option<String> {
        if change.is_partial {
            return None;
        }
        match change.status {
            ChangeStatus::Added | ChangeStatus::Deleted => None,
            _ => {
                let path = change
                    .previous_file_name
                    .as_deref()
                    .unwrap_or(&change.file_name);
                match self.source.file_at(path, &self.base_commit).await {
                    Ok(text) => Some(text),
                    Err(error) => {
                        warn!(
                            file = %path,
                            %error,
                            "failed to fetch original content; degrading to hunk-only reconstruction"
                        );
                        None
                    }
                }
            }
        }
    }
}

/// Parse one raw host change into a record.
///
/// A file whose patch fails to parse degrades to an empty partial record
/// with a warning; it never aborts resolution of its siblings.
fn parse_raw_change(raw: RawFileChange) -> FileChange {
    let status = ChangeStatus::from_host_status(&raw.status);
    match raw.patch {
        None => FileChange::Remote(RemoteChange {
            file_name: raw.file_name,
            previous_file_name: raw.previous_file_name,
            status,
            blob_url: raw.blob_url.unwrap_or_default(),
        }),
        Some(patch) => {
            let (hunks, is_partial) = match diff::parse_patch(&patch) {
                Ok(hunks) => (hunks, raw.is_partial),
                Err(error) => {
                    warn!(
                        file = %raw.file_name,
                        %error,
                        "failed to parse patch; treating diff as partial"
                    );
                    (Vec::new(), true)
                }
            };
            FileChange::InMemory(InMemoryChange {
                file_name: raw.file_name,
                previous_file_name: raw.previous_file_name,
                status,
                patch,
                hunks,
                is_partial,
            })
        }
    }
}
