//! prdoc — virtual documents for pull request review.
//!
//! Given a pull request's changed files (unified-diff patches plus
//! metadata), this crate reconstructs the base-side and head-side text of
//! each file on demand, without materializing either version on disk.
//! Reconstructed documents are addressed by stable, reversible tokens so an
//! editor surface can display side-by-side diffs and anchor comments to
//! specific lines.
//!
//! Raw diff/blob retrieval is abstracted behind [`source::ChangeSource`];
//! presentation and comment storage stay with the host.

pub mod address;
pub mod change;
pub mod config;
pub mod content;
pub mod diff;
pub mod ranges;
pub mod session;
pub mod source;

// Explicit re-exports - only export what hosts actually consume
pub use address::{decode, encode, Address};
pub use change::{ChangeStatus, FileChange, InMemoryChange, RemoteChange};
pub use config::Config;
pub use content::{reconstruct, Side};
pub use diff::{parse_patch, DiffHunk, DiffLine, DiffLineKind, ParseError};
pub use ranges::{commenting_ranges, LineRange};
pub use session::{ResolvedChange, ReviewSession, SessionEvent};
pub use source::{ChangeInfo, ChangeSource, FetchError, RawFileChange, ReviewComment};
