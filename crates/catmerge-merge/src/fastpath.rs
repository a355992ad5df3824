//! Line-oriented first attempt at a merge.
//!
//! A clean line merge is used verbatim, keeping the diff against Local as
//! small as possible. Anything else falls through to the entry-aware
//! pipeline.

use std::io;
use std::process::Command;

use catmerge_catalog::Catalog;
use catmerge_diff::{merge_lines, LineMerge};

use crate::config::{FastPathStrategy, MergeOptions};
use crate::error::{MergeError, Result};
use crate::pipeline::MergeInputs;
use crate::template::TemplateKeys;
use crate::workarea::WorkArea;

/// Outcome of the fast path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FastPath {
    /// The line merge succeeded; the merged bytes.
    Clean(Vec<u8>),
    /// Run the semantic pipeline.
    Fallback { reason: String },
}

impl FastPath {
    fn fallback(reason: impl Into<String>) -> Self {
        Self::Fallback {
            reason: reason.into(),
        }
    }
}

/// Attempt the configured line merge. Blocking; run it off the async
/// executor.
pub fn attempt(inputs: &MergeInputs, options: &MergeOptions, area: &WorkArea) -> Result<FastPath> {
    let merged = match options.fast_path {
        FastPathStrategy::Off => return Ok(FastPath::fallback("fast path disabled")),
        FastPathStrategy::Builtin => builtin(inputs),
        FastPathStrategy::Git => match git_merge_file(inputs, area) {
            Err(MergeError::DependencyMissing { tool, message })
                if options.allow_builtin_fallback =>
            {
                tracing::warn!(%tool, %message, "using builtin line merge instead");
                builtin(inputs)
            }
            other => other?,
        },
    };

    Ok(match merged {
        Some(bytes) => validate(bytes, inputs),
        None => FastPath::fallback("overlapping line changes"),
    })
}

fn builtin(inputs: &MergeInputs) -> Option<Vec<u8>> {
    match merge_lines(&inputs.base, &inputs.local, &inputs.other) {
        LineMerge::Clean(bytes) => Some(bytes),
        LineMerge::Conflicted { .. } => None,
    }
}

/// A clean line merge can still splice two catalogs into a wrong one: the
/// same key added at different places, or a key deleted on one side while
/// the other still has it. The result must parse and its live keys must be
/// exactly those of Local and Other, as the semantic pipeline would produce;
/// otherwise the semantic pipeline takes over.
fn validate(bytes: Vec<u8>, inputs: &MergeInputs) -> FastPath {
    let merged = match Catalog::from_bytes(&bytes) {
        Ok(merged) => merged,
        Err(err) => {
            return FastPath::fallback(format!("line merge produced an invalid catalog: {err}"))
        }
    };
    if !merged.is_canonical() {
        return FastPath::fallback("line merge produced duplicate keys");
    }

    let (Ok(local), Ok(other)) = (
        Catalog::from_bytes(&inputs.local),
        Catalog::from_bytes(&inputs.other),
    ) else {
        return FastPath::fallback("an input catalog does not parse");
    };
    let template = TemplateKeys::from_catalogs(&local, &other);
    let exact = merged.live().count() == template.len()
        && merged.live().all(|m| template.contains(&m.key));
    if !exact {
        return FastPath::fallback("line merge changed the set of live keys");
    }
    FastPath::Clean(bytes)
}

/// Run `git merge-file -p` on copies staged in the work area.
///
/// Returns `Ok(None)` when git reports conflicts.
fn git_merge_file(inputs: &MergeInputs, area: &WorkArea) -> Result<Option<Vec<u8>>> {
    let local = area.stage_file("local.po", &inputs.local)?;
    let base = area.stage_file("base.po", &inputs.base)?;
    let other = area.stage_file("other.po", &inputs.other)?;

    let output = Command::new("git")
        .arg("merge-file")
        .arg("-p")
        .args(["-L", "local", "-L", "base", "-L", "other"])
        .arg(&local)
        .arg(&base)
        .arg(&other)
        .output()
        .map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => MergeError::DependencyMissing {
                tool: "git".into(),
                message: err.to_string(),
            },
            _ => MergeError::Io(err),
        })?;

    match output.status.code() {
        Some(0) => Ok(Some(output.stdout)),
        // Positive exit codes count the conflicting hunks.
        Some(1..=127) => Ok(None),
        code => Err(MergeError::stage(
            crate::stage::Stage::FastPath,
            format!(
                "git merge-file exited with {code:?}: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        )),
    }
}
