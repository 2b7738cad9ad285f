//! Content reconstruction for either side of a file change.
//!
//! Two strategies, chosen per the change status and what is available:
//! hunk-only reconstruction (the hunks are the only source of truth, e.g.
//! pure adds/deletes and partial diffs) and patch application against a
//! retrieved original. Both are pure string transforms; fetching the
//! original is the caller's job.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::change::{ChangeStatus, InMemoryChange};
use crate::diff::{DiffHunk, DiffLineKind};

/// Which side of the change a reconstruction or range request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Base,
    Head,
}

/// Whether a line of `kind` appears in the reconstructed text for `side`.
/// Commenting ranges follow this same rule.
pub(crate) fn visible_on(kind: DiffLineKind, side: Side) -> bool {
    matches!(
        (kind, side),
        (DiffLineKind::Context, _)
            | (DiffLineKind::Added, Side::Head)
            | (DiffLineKind::Deleted, Side::Base)
    )
}

/// Concatenate the hunk lines visible on `side`, newline-joined, in hunk
/// order. Lossy outside hunk context for modified files; exact for pure
/// adds and deletes.
pub fn content_from_hunks(hunks: &[DiffHunk], side: Side) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for hunk in hunks {
        for line in &hunk.lines {
            if visible_on(line.kind, side) {
                lines.push(&line.text);
            }
        }
    }
    lines.join("\n")
}

/// Apply parsed hunks to the original (base-side) content, producing the
/// head-side text.
///
/// Outside hunk bounds the original is trusted verbatim. Inside a hunk the
/// new-side lines are spliced in wholesale, so line drift between the patch
/// and the original is tolerated within hunk boundaries. `old_len == 0`
/// means insert after line `old_start`, per the unified diff convention.
pub fn apply_patch(original: &str, hunks: &[DiffHunk]) -> String {
    let original_lines: Vec<&str> = original.lines().collect();
    let mut output: Vec<&str> = Vec::new();
    let mut cursor = 0usize;

    for hunk in hunks {
        let before_end = if hunk.old_len == 0 {
            hunk.old_start as usize
        } else {
            (hunk.old_start as usize).saturating_sub(1)
        };
        let before_end = before_end.min(original_lines.len());
        if cursor < before_end {
            output.extend_from_slice(&original_lines[cursor..before_end]);
            cursor = before_end;
        }
        for line in &hunk.lines {
            if visible_on(line.kind, Side::Head) {
                output.push(&line.text);
            }
        }
        cursor = (cursor + hunk.old_len as usize).min(original_lines.len());
    }

    if cursor < original_lines.len() {
        output.extend_from_slice(&original_lines[cursor..]);
    }

    let mut text = output.join("\n");
    if original.ends_with('\n') && !text.is_empty() {
        text.push('\n');
    }
    text
}

/// Produce the text of `change` as seen on `side`.
///
/// `original` is the base-side content retrieved from the change source, if
/// any. Never panics: a missing original degrades to hunk-only
/// reconstruction rather than failing the request.
pub fn reconstruct(change: &InMemoryChange, side: Side, original: Option<&str>) -> String {
    match (change.status, side) {
        (ChangeStatus::Added, Side::Base) | (ChangeStatus::Deleted, Side::Head) => String::new(),
        (ChangeStatus::Added, Side::Head) | (ChangeStatus::Deleted, Side::Base) => {
            content_from_hunks(&change.hunks, side)
        }
        (_, side) => {
            if change.is_partial {
                return content_from_hunks(&change.hunks, side);
            }
            match original {
                Some(original) => match side {
                    Side::Base => original.to_string(),
                    Side::Head => apply_patch(original, &change.hunks),
                },
                None => {
                    debug!(
                        file = %change.file_name,
                        "no original content; falling back to hunk-only reconstruction"
                    );
                    content_from_hunks(&change.hunks, side)
                }
            }
        }
    }
}
