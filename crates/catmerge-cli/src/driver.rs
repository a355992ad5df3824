use std::path::{Path, PathBuf};
use std::process::ExitCode;

use catmerge_catalog::{Catalog, CatalogError, MessageKey};
use catmerge_merge::{
    contains_conflict_marker, find_conflicts, MergeError, MergeInputs, MergeOptions, MergePath,
    MergePipeline, MergeReport, Side, WorkArea,
};

/// Process exit status of the merge driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    /// Merged without unresolved conflicts.
    Clean,
    /// The output holds conflict markers.
    Conflicts,
    /// An input catalog is missing or could not be parsed.
    Malformed,
    /// A required external tool is missing.
    DependencyMissing,
    Internal,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        match self {
            Self::Clean => 0,
            Self::Conflicts => 1,
            Self::Malformed => 2,
            Self::DependencyMissing => 3,
            Self::Internal => 255,
        }
    }

    pub fn from_merge_error(err: &MergeError) -> Self {
        match err {
            MergeError::Parse { .. } | MergeError::MissingInput { .. } => Self::Malformed,
            MergeError::DependencyMissing { .. } => Self::DependencyMissing,
            MergeError::Stage { .. } | MergeError::Io(_) => Self::Internal,
        }
    }

    /// Map any error reaching the top level.
    pub fn from_error(err: &anyhow::Error) -> Self {
        if let Some(err) = err.downcast_ref::<MergeError>() {
            return Self::from_merge_error(err);
        }
        match err.downcast_ref::<CatalogError>() {
            Some(CatalogError::Parse { .. } | CatalogError::Encoding(_)) => Self::Malformed,
            _ => Self::Internal,
        }
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status.code())
    }
}

/// The files of one merge-driver invocation.
#[derive(Clone, Debug)]
pub struct MergeRequest {
    pub base: PathBuf,
    /// Also the output target.
    pub local: PathBuf,
    pub other: PathBuf,
    /// Name used in messages.
    pub display: String,
}

/// What the driver did.
#[derive(Clone, Debug)]
pub struct DriverOutcome {
    pub status: ExitStatus,
    pub path: MergePath,
    pub report: MergeReport,
    /// Keys still carrying markers in the written file.
    pub unresolved: Vec<MessageKey>,
}

/// Runs one merge from files to files.
pub struct Driver {
    pipeline: MergePipeline,
}

impl Driver {
    pub fn new(options: MergeOptions) -> Self {
        Self {
            pipeline: MergePipeline::new(options),
        }
    }

    /// Merge the request's files and overwrite Local with the result.
    ///
    /// Local is only replaced once the pipeline has succeeded; on error it
    /// is left as it was. The work area is removed on every path.
    pub async fn merge(&self, request: &MergeRequest) -> Result<DriverOutcome, MergeError> {
        for (side, path) in [
            (Side::Base, &request.base),
            (Side::Local, &request.local),
            (Side::Other, &request.other),
        ] {
            require_file(side, path)?;
        }

        let area = WorkArea::new()?;
        let inputs = MergeInputs::read(&request.base, &request.local, &request.other).await?;
        let outcome = self.pipeline.run(inputs, &area).await?;

        let staged = area.stage_file("merged.po", &outcome.content)?;
        tokio::fs::copy(&staged, &request.local).await?;
        tracing::debug!(file = %request.local.display(), "wrote merge result");

        let written = tokio::fs::read(&request.local).await?;
        let (unresolved, marked) = scan(&written);
        let status = if marked {
            ExitStatus::Conflicts
        } else {
            ExitStatus::Clean
        };
        if marked != outcome.has_conflicts() {
            tracing::warn!(
                file = %request.display,
                "marker scan disagrees with merge report"
            );
        }

        Ok(DriverOutcome {
            status,
            path: outcome.path,
            report: outcome.report,
            unresolved,
        })
    }
}

fn require_file(side: Side, path: &Path) -> Result<(), MergeError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(MergeError::MissingInput {
            side,
            path: path.to_path_buf(),
        })
    }
}

/// Look for residual markers. A parseable catalog is scanned by value;
/// anything else line by line.
pub fn scan(content: &[u8]) -> (Vec<MessageKey>, bool) {
    match Catalog::from_bytes(content) {
        Ok(catalog) => {
            let keys = find_conflicts(&catalog);
            let marked = !keys.is_empty();
            (keys, marked)
        }
        Err(_) => (Vec::new(), contains_conflict_marker(content)),
    }
}
