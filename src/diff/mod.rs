//! Unified diff hunk model.
//!
//! This module parses raw patch text into structured hunks of typed lines:
//! - Line classification (Context, Added, Deleted, Control)
//! - Per-hunk old/new ranges taken from the `@@` header
//! - Incremental old/new line numbers computed per hunk
//!
//! File-level metadata (`diff --git`, `index`, `---`, `+++`) before the first
//! hunk is skipped; parsing works both on full git patches and on the
//! header-less per-file patches returned by hosting APIs.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed hunk header: {header:?}")]
    MalformedHunkHeader { header: String },
}

/// Classification of a single line in a diff patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffLineKind {
    /// Unchanged line, present on both sides (starts with space)
    Context,
    /// Line added in the new version (starts with +)
    Added,
    /// Line removed from the old version (starts with -)
    Deleted,
    /// Marker line such as "\ No newline at end of file"
    Control,
}

/// One line of a hunk, with the diff marker stripped.
#[derive(Debug, Clone)]
pub struct DiffLine {
    pub kind: DiffLineKind,
    pub text: String,
    /// Line number in the old file (None for Added and Control lines)
    pub old_line: Option<u32>,
    /// Line number in the new file (None for Deleted and Control lines)
    pub new_line: Option<u32>,
}

/// A contiguous block of a unified diff.
///
/// Ranges are the 1-based start/length pairs declared by the hunk header
/// `@@ -old_start,old_len +new_start,new_len @@`.
#[derive(Debug, Clone)]
pub struct DiffHunk {
    pub old_start: u32,
    pub old_len: u32,
    pub new_start: u32,
    pub new_len: u32,
    pub lines: Vec<DiffLine>,
}

/// Parse a hunk header into (old_start, old_len, new_start, new_len).
/// A missing length defaults to 1, per the unified diff format.
fn parse_hunk_header(line: &str) -> Option<(u32, u32, u32, u32)> {
    let rest = line.strip_prefix("@@ -")?;
    let (old, rest) = rest.split_once(" +")?;
    let (new, _) = rest.split_once(" @@")?;
    let (old_start, old_len) = parse_range(old)?;
    let (new_start, new_len) = parse_range(new)?;
    Some((old_start, old_len, new_start, new_len))
}

fn parse_range(spec: &str) -> Option<(u32, u32)> {
    match spec.split_once(',') {
        Some((start, len)) => Some((start.parse().ok()?, len.parse().ok()?)),
        None => Some((spec.parse().ok()?, 1)),
    }
}

struct HunkBuilder {
    hunk: DiffHunk,
    old_counter: u32,
    new_counter: u32,
}

impl HunkBuilder {
    fn new(old_start: u32, old_len: u32, new_start: u32, new_len: u32) -> Self {
        Self {
            hunk: DiffHunk {
                old_start,
                old_len,
                new_start,
                new_len,
                lines: Vec::new(),
            },
            old_counter: old_start,
            new_counter: new_start,
        }
    }

    /// Classify one body line and advance the side counters it appears on.
    fn push(&mut self, line: &str) {
        let (kind, text) = classify_line(line);
        let (old_line, new_line) = match kind {
            DiffLineKind::Context => {
                let numbers = (Some(self.old_counter), Some(self.new_counter));
                self.old_counter += 1;
                self.new_counter += 1;
                numbers
            }
            DiffLineKind::Added => {
                let numbers = (None, Some(self.new_counter));
                self.new_counter += 1;
                numbers
            }
            DiffLineKind::Deleted => {
                let numbers = (Some(self.old_counter), None);
                self.old_counter += 1;
                numbers
            }
            DiffLineKind::Control => (None, None),
        };
        self.hunk.lines.push(DiffLine {
            kind,
            text: text.to_string(),
            old_line,
            new_line,
        });
    }
}

/// Classify a line and strip its diff marker.
///
/// Lines without a recognized marker fall back to Context; some producers
/// trim the trailing space off empty context lines.
fn classify_line(line: &str) -> (DiffLineKind, &str) {
    if let Some(rest) = line.strip_prefix('\\') {
        (DiffLineKind::Control, rest.trim_start())
    } else if let Some(content) = line.strip_prefix('+') {
        (DiffLineKind::Added, content)
    } else if let Some(content) = line.strip_prefix('-') {
        (DiffLineKind::Deleted, content)
    } else if let Some(content) = line.strip_prefix(' ') {
        (DiffLineKind::Context, content)
    } else {
        (DiffLineKind::Context, line)
    }
}

/// Parse a single file's patch text into its ordered hunks.
///
/// Fails on the first malformed `@@` header; hunks parsed before that point
/// are discarded by the caller along with the error, so a bad header never
/// produces a half-wrong hunk sequence.
pub fn parse_patch(patch: &str) -> Result<Vec<DiffHunk>, ParseError> {
    let mut hunks: Vec<DiffHunk> = Vec::new();
    let mut current: Option<HunkBuilder> = None;

    for line in patch.lines() {
        if line.starts_with("@@") {
            let Some((old_start, old_len, new_start, new_len)) = parse_hunk_header(line) else {
                return Err(ParseError::MalformedHunkHeader {
                    header: line.to_string(),
                });
            };
            if let Some(builder) = current.take() {
                hunks.push(builder.hunk);
            }
            current = Some(HunkBuilder::new(old_start, old_len, new_start, new_len));
            continue;
        }

        match current.as_mut() {
            Some(builder) => builder.push(line),
            // File metadata before the first hunk
            None => continue,
        }
    }

    if let Some(builder) = current.take() {
        hunks.push(builder.hunk);
    }

    Ok(hunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    const SAMPLE_PATCH: &str = "\
@@ -1,4 +1,5 @@
 line 1
-old line 2
+new line 2
+added line
 line 3";

    fn format_hunks(hunks: &[DiffHunk]) -> String {
        let mut output = String::new();
        for hunk in hunks {
            output.push_str(&format!(
                "@@ -{},{} +{},{} @@\n",
                hunk.old_start, hunk.old_len, hunk.new_start, hunk.new_len
            ));
            for line in &hunk.lines {
                let marker = match line.kind {
                    DiffLineKind::Context => "ctx",
                    DiffLineKind::Added => "add",
                    DiffLineKind::Deleted => "del",
                    DiffLineKind::Control => "ctl",
                };
                let number = |n: Option<u32>| n.map_or("-".to_string(), |n| n.to_string());
                output.push_str(&format!(
                    "[{}] {} ({}:{})\n",
                    marker,
                    line.text,
                    number(line.old_line),
                    number(line.new_line)
                ));
            }
        }
        output
    }

    #[test]
    fn test_parse_hunk_header() {
        assert_eq!(parse_hunk_header("@@ -1,4 +1,5 @@"), Some((1, 4, 1, 5)));
        assert_eq!(parse_hunk_header("@@ -10,3 +15,7 @@"), Some((10, 3, 15, 7)));
        assert_eq!(parse_hunk_header("@@ -1 +1 @@"), Some((1, 1, 1, 1)));
        assert_eq!(
            parse_hunk_header("@@ -0,0 +1,3 @@ fn main()"),
            Some((0, 0, 1, 3))
        );
    }

    #[test]
    fn test_parse_hunk_header_malformed() {
        assert_eq!(parse_hunk_header("@@ garbage @@"), None);
        assert_eq!(parse_hunk_header("@@ -a,b +c,d @@"), None);
        assert_eq!(parse_hunk_header("@@"), None);
    }

    #[test]
    fn test_parse_single_hunk_line_numbers() {
        let hunks = parse_patch(SAMPLE_PATCH).unwrap();
        assert_snapshot!(format_hunks(&hunks), @r#"
        @@ -1,4 +1,5 @@
        [ctx] line 1 (1:1)
        [del] old line 2 (2:-)
        [add] new line 2 (-:2)
        [add] added line (-:3)
        [ctx] line 3 (3:4)
        "#);
    }

    #[test]
    fn test_parse_skips_file_metadata() {
        let patch = "\
diff --git a/src/main.rs b/src/main.rs
index 1234567..abcdefg 100644
--- a/src/main.rs
+++ b/src/main.rs
@@ -1,3 +1,4 @@
 fn main() {
+    println!(\"Hello\");
 }";
        let hunks = parse_patch(patch).unwrap();
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].lines.len(), 3);
        assert_eq!(hunks[0].lines[1].kind, DiffLineKind::Added);
        assert_eq!(hunks[0].lines[1].text, "    println!(\"Hello\");");
    }

    #[test]
    fn test_parse_multi_hunk() {
        let patch = "\
@@ -1,3 +1,3 @@
-old1
+new1
 ctx
@@ -10,3 +10,3 @@
 ctx2
-old2
+new2";
        let hunks = parse_patch(patch).unwrap();
        assert_eq!(hunks.len(), 2);
        // Counters restart from each hunk's header offsets
        assert_eq!(hunks[1].lines[0].old_line, Some(10));
        assert_eq!(hunks[1].lines[0].new_line, Some(10));
        assert_eq!(hunks[1].lines[1].old_line, Some(11));
        assert_eq!(hunks[1].lines[2].new_line, Some(11));
    }

    #[test]
    fn test_parse_control_line_has_no_numbers() {
        let patch = "\
@@ -1,2 +1,2 @@
 line 1
-old tail
+new tail
\\ No newline at end of file";
        let hunks = parse_patch(patch).unwrap();
        let control = hunks[0].lines.last().unwrap();
        assert_eq!(control.kind, DiffLineKind::Control);
        assert!(control.old_line.is_none());
        assert!(control.new_line.is_none());
        // Control lines do not advance either counter
        assert_eq!(hunks[0].lines[2].new_line, Some(2));
    }

    #[test]
    fn test_parse_pure_addition() {
        let patch = "\
@@ -0,0 +1,3 @@
+fn new_function() {
+    todo!()
+}";
        let hunks = parse_patch(patch).unwrap();
        assert_snapshot!(format_hunks(&hunks), @r#"
        @@ -0,0 +1,3 @@
        [add] fn new_function() { (-:1)
        [add]     todo!() (-:2)
        [add] } (-:3)
        "#);
    }

    #[test]
    fn test_parse_pure_deletion() {
        let patch = "\
@@ -1,3 +0,0 @@
-fn old_function() {
-    todo!()
-}";
        let hunks = parse_patch(patch).unwrap();
        assert_eq!(hunks[0].lines.len(), 3);
        for (index, line) in hunks[0].lines.iter().enumerate() {
            assert_eq!(line.kind, DiffLineKind::Deleted);
            assert_eq!(line.old_line, Some(index as u32 + 1));
            assert!(line.new_line.is_none());
        }
    }

    #[test]
    fn test_parse_malformed_header_is_an_error() {
        let patch = "\
@@ -1,2 +1,2 @@
 ok
@@ -notanumber +1,2 @@
 broken";
        let err = parse_patch(patch).unwrap_err();
        assert!(matches!(err, ParseError::MalformedHunkHeader { ref header } if header.contains("notanumber")));
    }

    #[test]
    fn test_parse_unprefixed_line_falls_back_to_context() {
        let patch = "@@ -1,2 +1,2 @@\nno prefix\n other";
        let hunks = parse_patch(patch).unwrap();
        assert_eq!(hunks[0].lines[0].kind, DiffLineKind::Context);
        assert_eq!(hunks[0].lines[0].text, "no prefix");
        assert_eq!(hunks[0].lines[0].old_line, Some(1));
        assert_eq!(hunks[0].lines[0].new_line, Some(1));
    }

    #[test]
    fn test_parse_empty_patch() {
        assert!(parse_patch("").unwrap().is_empty());
    }
}
