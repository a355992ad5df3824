//! Line-by-line comparison of two translation values.
//!
//! Uses the `similar` crate (Myers diff algorithm) to produce structured
//! hunks with context lines. The conflict reporter uses this to show how the
//! two sides of a conflicting entry differ.

use similar::{ChangeTag, TextDiff as SimilarDiff};

/// The result of diffing two texts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextDiff {
    /// The diff hunks.
    pub hunks: Vec<DiffHunk>,
    /// Total number of lines in the old text.
    pub old_lines: usize,
    /// Total number of lines in the new text.
    pub new_lines: usize,
}

impl TextDiff {
    /// Returns `true` if the two texts are identical.
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    /// All lines of all hunks in order.
    pub fn lines(&self) -> impl Iterator<Item = &DiffLine> {
        self.hunks.iter().flat_map(|h| &h.lines)
    }
}

/// A contiguous region of changes in a diff.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffHunk {
    /// Line number in the old text where this hunk starts (1-based).
    pub old_start: usize,
    /// Line number in the new text where this hunk starts (1-based).
    pub new_start: usize,
    /// The individual diff lines in this hunk.
    pub lines: Vec<DiffLine>,
}

/// A single line in a diff hunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiffLine {
    /// A line present in both texts (context).
    Context(String),
    /// A line only in the new text.
    Added(String),
    /// A line only in the old text.
    Removed(String),
}

/// Compute a line-by-line diff with `context` lines around each change.
pub fn diff_text(old: &str, new: &str, context: usize) -> TextDiff {
    let old_lines = old.lines().count();
    let new_lines = new.lines().count();

    if old == new {
        return TextDiff {
            hunks: Vec::new(),
            old_lines,
            new_lines,
        };
    }

    let text_diff = SimilarDiff::from_lines(old, new);
    let mut hunks = Vec::new();

    for group in text_diff.grouped_ops(context) {
        let Some(first) = group.first() else {
            continue;
        };
        let mut hunk = DiffHunk {
            old_start: first.old_range().start + 1,
            new_start: first.new_range().start + 1,
            lines: Vec::new(),
        };

        for op in &group {
            for change in text_diff.iter_changes(op) {
                let text = change.value().trim_end_matches('\n').to_string();
                hunk.lines.push(match change.tag() {
                    ChangeTag::Equal => DiffLine::Context(text),
                    ChangeTag::Delete => DiffLine::Removed(text),
                    ChangeTag::Insert => DiffLine::Added(text),
                });
            }
        }
        hunks.push(hunk);
    }

    TextDiff {
        hunks,
        old_lines,
        new_lines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_texts_no_diff() {
        let diff = diff_text("hello\nworld\n", "hello\nworld\n", 3);
        assert!(diff.is_empty());
        assert_eq!(diff.lines().count(), 0);
    }

    #[test]
    fn single_line_values() {
        let diff = diff_text("Hi", "Hey", 3);
        assert_eq!(diff.hunks.len(), 1);
        assert_eq!(
            diff.hunks[0].lines,
            vec![DiffLine::Removed("Hi".into()), DiffLine::Added("Hey".into())]
        );
    }

    #[test]
    fn single_line_addition() {
        let diff = diff_text("line1\nline2\n", "line1\nline2\nline3\n", 3);
        let changed: Vec<&DiffLine> = diff
            .lines()
            .filter(|l| !matches!(l, DiffLine::Context(_)))
            .collect();
        assert_eq!(changed, vec![&DiffLine::Added("line3".into())]);
    }

    #[test]
    fn content_to_empty() {
        let diff = diff_text("old content\n", "", 3);
        assert!(diff.lines().any(|l| matches!(l, DiffLine::Removed(_))));
        assert_eq!(diff.new_lines, 0);
    }

    #[test]
    fn hunk_line_numbers() {
        let diff = diff_text("a\nb\nc\nd\ne\n", "a\nb\nX\nd\ne\n", 1);
        let hunk = &diff.hunks[0];
        assert_eq!(hunk.old_start, 2);
        assert_eq!(hunk.new_start, 2);
        assert_eq!(
            hunk.lines,
            vec![
                DiffLine::Context("b".into()),
                DiffLine::Removed("c".into()),
                DiffLine::Added("X".into()),
                DiffLine::Context("d".into()),
            ]
        );
    }

    #[test]
    fn zero_context_has_only_changes() {
        let diff = diff_text("a\nb\nc\n", "a\nB\nc\n", 0);
        assert!(diff.lines().all(|l| !matches!(l, DiffLine::Context(_))));
    }
}
