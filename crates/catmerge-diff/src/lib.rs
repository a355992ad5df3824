//! Diff engine for catmerge.
//!
//! Computes the comparisons the merge pipeline is built on: a raw line-level
//! three-way merge for the fast path, entry-level diffs between catalogs,
//! and the change sets fed to the conflict classifier.
//!
//! # Key Types
//!
//! - [`LineMerge`] -- Outcome of the line-oriented three-way merge
//! - [`CatalogDiff`] / [`EntryChange`] -- Entry-level catalog diff (added/removed/modified keys)
//! - [`ChangeSet`] -- Entries of one branch that changed relative to the ancestor
//! - [`TextDiff`] / [`DiffHunk`] / [`DiffLine`] -- Line-level diff of two values

pub mod catalog_diff;
pub mod line_merge;
pub mod text_diff;

pub use catalog_diff::{
    diff_catalogs, extract_additions, extract_changes, CatalogDiff, ChangeSet, EntryChange,
};
pub use line_merge::{merge_lines, LineMerge};
pub use text_diff::{diff_text, DiffHunk, DiffLine, TextDiff};
