//! Commentable line ranges for reconstructed documents.
//!
//! A line is commentable iff reconstruction would have included it on that
//! side, so ranges are derived from the same hunks and the same visibility
//! rule as the content itself, expressed as 1-based inclusive intervals.

use serde::{Deserialize, Serialize};

use crate::content::{visible_on, Side};
use crate::diff::DiffHunk;

/// 1-based inclusive line interval in a reconstructed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    pub start: u32,
    pub end: u32,
}

/// Derive the commentable ranges of `hunks` for `side`.
///
/// Output is disjoint and sorted ascending by start line. Ranges from
/// adjacent hunks are kept separate even when contiguous in the document;
/// callers that want them merged apply [`coalesce`].
pub fn commenting_ranges(hunks: &[DiffHunk], side: Side) -> Vec<LineRange> {
    let mut ranges: Vec<LineRange> = Vec::new();

    for hunk in hunks {
        let mut current: Option<LineRange> = None;
        for line in &hunk.lines {
            if !visible_on(line.kind, side) {
                // Lines from the other side (and control markers) consume no
                // line number here, so they do not break a run.
                continue;
            }
            let number = match side {
                Side::Base => line.old_line,
                Side::Head => line.new_line,
            };
            let Some(number) = number else { continue };
            match current.as_mut() {
                Some(range) if number == range.end + 1 => range.end = number,
                _ => {
                    if let Some(range) = current.take() {
                        ranges.push(range);
                    }
                    current = Some(LineRange {
                        start: number,
                        end: number,
                    });
                }
            }
        }
        if let Some(range) = current.take() {
            ranges.push(range);
        }
    }

    ranges
}

/// Merge adjacent and overlapping ranges of a sorted sequence.
pub fn coalesce(ranges: Vec<LineRange>) -> Vec<LineRange> {
    let mut merged: Vec<LineRange> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start <= last.end.saturating_add(1) => {
                last.end = last.end.max(range.end);
            }
            _ => merged.push(range),
        }
    }
    merged
}

/// Map a document line number back to its position within the patch.
///
/// Position counts every patch line below the first hunk header; subsequent
/// hunk headers are themselves counted. This matches the position convention
/// review hosts use when anchoring a comment to a patch offset.
pub fn position_for_line(hunks: &[DiffHunk], side: Side, line: u32) -> Option<u32> {
    let mut position: u32 = 0;
    for (index, hunk) in hunks.iter().enumerate() {
        if index > 0 {
            position += 1;
        }
        for hunk_line in &hunk.lines {
            position += 1;
            if !visible_on(hunk_line.kind, side) {
                continue;
            }
            let number = match side {
                Side::Base => hunk_line.old_line,
                Side::Head => hunk_line.new_line,
            };
            if number == Some(line) {
                return Some(position);
            }
        }
    }
    None
}
