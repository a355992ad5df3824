//! Entry-aware three-way merge of translation catalogs.
//!
//! A merge first tries a plain line merge. When that fails the catalogs are
//! canonicalized, each branch's changes are extracted relative to the
//! ancestor, and the changes are classified, assembled, filtered to the
//! branches' keys, and given Local's header. Keys changed differently on
//! both branches come out as fuzzy entries holding both variants between
//! `#-#-#-#-#` markers.
//!
//! # Quick Start
//!
//! ```rust
//! use catmerge_merge::{MergeInputs, MergeOptions, MergePipeline, WorkArea};
//!
//! let base = "msgid \"k1\"\nmsgstr \"Hello\"\n\nmsgid \"k2\"\nmsgstr \"World\"\n";
//! let local = base.replace("Hello", "Hi");
//! let other = base.replace("World", "Planet");
//!
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! let area = WorkArea::new().unwrap();
//! let outcome = runtime
//!     .block_on(MergePipeline::new(MergeOptions::default()).run(
//!         MergeInputs::new(base, local, other),
//!         &area,
//!     ))
//!     .unwrap();
//! assert!(!outcome.has_conflicts());
//! ```

pub mod assemble;
pub mod classify;
pub mod config;
pub mod conflict;
pub mod error;
pub mod fastpath;
pub mod header;
pub mod pipeline;
pub mod stage;
pub mod template;
pub mod workarea;

// Re-exports for convenience.
pub use assemble::{assemble, unchanged_entries, RawMerge};
pub use classify::{classify, BranchChanges, Classification};
pub use config::{ConflictLabels, FastPathStrategy, MergeOptions};
pub use conflict::{
    contains_conflict_marker, find_conflicts, render_conflict, MergeValue, MergedEntry, Origin,
    CONFLICT_MARKER, CONFLICT_SCAN,
};
pub use error::{MergeError, Result};
pub use fastpath::FastPath;
pub use header::reconcile_header;
pub use pipeline::{
    ConflictRecord, MergeInputs, MergeOutcome, MergePath, MergePipeline, MergeReport,
};
pub use stage::{Side, Stage, StageRecord};
pub use template::{carry_graveyard, reconcile_template, Reconciled, TemplateKeys};
pub use workarea::WorkArea;
