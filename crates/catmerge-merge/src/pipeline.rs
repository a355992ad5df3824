//! The staged merge pipeline.
//!
//! ```text
//! fast path -> clean: done
//!     |
//!     +-> fallback -> canonicalize x3 -> header + changes x2 + unchanged
//!                  -> classify -> assemble -> template -> header -> serialize
//! ```
//!
//! Independent work inside a stage runs as blocking tasks joined before the
//! next stage. Every stage consumes the previous stage's output by value or
//! through an `Arc`; nothing is shared mutably.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use catmerge_catalog::{encode_catalog, Catalog, MessageKey};

use crate::assemble::{assemble, unchanged_entries};
use crate::classify::{classify, BranchChanges};
use crate::config::MergeOptions;
use crate::conflict::{MergeValue, MergedEntry, Origin};
use crate::error::{MergeError, Result};
use crate::fastpath::{self, FastPath};
use crate::header::reconcile_header;
use crate::stage::{Side, Stage, StageRecord};
use crate::template::{carry_graveyard, reconcile_template, TemplateKeys};
use crate::workarea::WorkArea;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Raw content of the three input catalogs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergeInputs {
    pub base: Vec<u8>,
    pub local: Vec<u8>,
    pub other: Vec<u8>,
}

impl MergeInputs {
    pub fn new(
        base: impl Into<Vec<u8>>,
        local: impl Into<Vec<u8>>,
        other: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            base: base.into(),
            local: local.into(),
            other: other.into(),
        }
    }

    /// Read the three files concurrently.
    pub async fn read(base: &Path, local: &Path, other: &Path) -> Result<Self> {
        let (base, local, other) = tokio::try_join!(
            tokio::fs::read(base),
            tokio::fs::read(local),
            tokio::fs::read(other),
        )?;
        Ok(Self { base, local, other })
    }

    fn side(&self, side: Side) -> &[u8] {
        match side {
            Side::Base => &self.base,
            Side::Local => &self.local,
            Side::Other => &self.other,
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Which route produced the result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergePath {
    FastPath,
    Semantic,
}

/// One unresolved key with both variants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConflictRecord {
    pub context: Option<String>,
    pub msgid: String,
    pub local: Vec<String>,
    pub other: Vec<String>,
}

impl ConflictRecord {
    fn from_entry(entry: &MergedEntry) -> Option<Self> {
        match &entry.value {
            MergeValue::Conflict { local, other } => Some(Self {
                context: entry.key.context.clone(),
                msgid: entry.key.msgid.clone(),
                local: local.slots().to_vec(),
                other: other.slots().to_vec(),
            }),
            MergeValue::Resolved(_) => None,
        }
    }

    pub fn key(&self) -> MessageKey {
        MessageKey {
            context: self.context.clone(),
            msgid: self.msgid.clone(),
        }
    }
}

/// Summary of what the merge did. Counts are zero for a fast-path merge.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub conflicts: Vec<ConflictRecord>,
    pub unchanged: usize,
    pub local_only: usize,
    pub other_only: usize,
    pub both: usize,
    /// Assembled entries removed by the template.
    pub dropped: usize,
    /// Graveyard entries carried into the output.
    pub graveyard: usize,
}

impl MergeReport {
    fn from_entries(entries: &[MergedEntry]) -> Self {
        let mut report = Self::default();
        for entry in entries {
            match entry.origin {
                Origin::Unchanged => report.unchanged += 1,
                Origin::Local => report.local_only += 1,
                Origin::Other => report.other_only += 1,
                Origin::Both => report.both += 1,
                Origin::Conflict => report.conflicts.extend(ConflictRecord::from_entry(entry)),
            }
        }
        report
    }
}

/// Result of a merge that ran to completion.
#[derive(Clone, Debug)]
pub struct MergeOutcome {
    /// Serialized result, to be written over Local.
    pub content: Vec<u8>,
    pub path: MergePath,
    pub report: MergeReport,
    /// Completed stages in order, with timings.
    pub stages: Vec<StageRecord>,
}

impl MergeOutcome {
    pub fn has_conflicts(&self) -> bool {
        !self.report.conflicts.is_empty()
    }
}

// ---------------------------------------------------------------------------
// MergePipeline
// ---------------------------------------------------------------------------

/// Three-way merge of translation catalogs.
#[derive(Clone, Debug, Default)]
pub struct MergePipeline {
    options: Arc<MergeOptions>,
}

impl MergePipeline {
    pub fn new(options: MergeOptions) -> Self {
        Self {
            options: Arc::new(options),
        }
    }

    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// Merge `inputs`, trying the fast path first.
    ///
    /// The result depends only on the input bytes and the options. A
    /// conflict is a successful outcome; errors mean no usable result.
    pub async fn run(&self, inputs: MergeInputs, area: &WorkArea) -> Result<MergeOutcome> {
        let inputs = Arc::new(inputs);
        let mut timeline = Timeline::default();

        let start = Instant::now();
        let fast = {
            let inputs = Arc::clone(&inputs);
            let options = Arc::clone(&self.options);
            let area = area.clone();
            blocking(Stage::FastPath, move || {
                fastpath::attempt(&inputs, &options, &area)
            })
            .await?
        };
        timeline.record(Stage::FastPath, start);

        match fast {
            FastPath::Clean(content) => {
                tracing::info!("line merge succeeded");
                Ok(MergeOutcome {
                    content,
                    path: MergePath::FastPath,
                    report: MergeReport::default(),
                    stages: timeline.into_records(),
                })
            }
            FastPath::Fallback { reason } => {
                tracing::info!(%reason, "falling back to semantic merge");
                self.semantic(inputs, timeline).await
            }
        }
    }

    async fn semantic(
        &self,
        inputs: Arc<MergeInputs>,
        mut timeline: Timeline,
    ) -> Result<MergeOutcome> {
        let start = Instant::now();
        let (base, local, other) = tokio::try_join!(
            canonicalize(Arc::clone(&inputs), Side::Base),
            canonicalize(Arc::clone(&inputs), Side::Local),
            canonicalize(Arc::clone(&inputs), Side::Other),
        )?;
        let (base, local, other) = (Arc::new(base), Arc::new(local), Arc::new(other));
        timeline.record(Stage::Canonicalize, start);

        let start = Instant::now();
        let (header, local_changes, other_changes, unchanged) = tokio::try_join!(
            {
                let local = Arc::clone(&local);
                blocking(Stage::ExtractChanges, move || Ok(local.extract_header()))
            },
            {
                let (local, base) = (Arc::clone(&local), Arc::clone(&base));
                blocking(Stage::ExtractChanges, move || {
                    Ok(BranchChanges::extract(&local, &base))
                })
            },
            {
                let (other, base) = (Arc::clone(&other), Arc::clone(&base));
                blocking(Stage::ExtractChanges, move || {
                    Ok(BranchChanges::extract(&other, &base))
                })
            },
            {
                let (base, local, other) =
                    (Arc::clone(&base), Arc::clone(&local), Arc::clone(&other));
                blocking(Stage::ExtractChanges, move || {
                    Ok(unchanged_entries(&base, &local, &other))
                })
            },
        )?;
        timeline.record(Stage::ExtractChanges, start);

        let start = Instant::now();
        let classification = classify(&local_changes, &other_changes);
        timeline.record(Stage::Classify, start);

        let start = Instant::now();
        let raw = assemble(unchanged, classification);
        timeline.record(Stage::Assemble, start);

        let start = Instant::now();
        let template = TemplateKeys::from_catalogs(&local, &other);
        let reconciled = reconcile_template(raw, &template)?;
        let graveyard = carry_graveyard(&local, &other, &template);
        timeline.record(Stage::Template, start);

        let mut report = MergeReport::from_entries(&reconciled.entries);
        report.dropped = reconciled.dropped;
        report.graveyard = graveyard.len();

        let start = Instant::now();
        let merged = reconcile_header(reconciled.entries, graveyard, header, &self.options.labels);
        timeline.record(Stage::Header, start);

        let start = Instant::now();
        let content = encode_catalog(&merged, &self.options.write)
            .map_err(|err| MergeError::stage(Stage::Serialize, err.to_string()))?;
        timeline.record(Stage::Serialize, start);

        tracing::debug!(
            conflicts = report.conflicts.len(),
            unchanged = report.unchanged,
            local_only = report.local_only,
            other_only = report.other_only,
            both = report.both,
            dropped = report.dropped,
            "semantic merge complete"
        );

        Ok(MergeOutcome {
            content,
            path: MergePath::Semantic,
            report,
            stages: timeline.into_records(),
        })
    }
}

async fn canonicalize(inputs: Arc<MergeInputs>, side: Side) -> Result<Catalog> {
    blocking(Stage::Canonicalize, move || {
        Catalog::from_bytes(inputs.side(side))
            .map(Catalog::canonicalize)
            .map_err(|source| MergeError::Parse { side, source })
    })
    .await
}

/// Run CPU-bound work off the async executor. A task that panics or is
/// cancelled becomes a stage error.
async fn blocking<T, F>(stage: Stage, work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| MergeError::stage(stage, format!("task failed: {err}")))?
}

#[derive(Default)]
struct Timeline {
    records: Vec<StageRecord>,
}

impl Timeline {
    fn record(&mut self, stage: Stage, start: Instant) {
        let elapsed = start.elapsed();
        tracing::debug!(
            stage = %stage,
            elapsed_us = elapsed.as_micros() as u64,
            "stage complete"
        );
        self.records.push(StageRecord { stage, elapsed });
    }

    fn into_records(self) -> Vec<StageRecord> {
        self.records
    }
}
