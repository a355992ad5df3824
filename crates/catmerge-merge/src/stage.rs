use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// Which of the three input catalogs something refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// The common ancestor.
    Base,
    /// The current branch; also the output target.
    Local,
    /// The incoming branch.
    Other,
}

impl Side {
    pub const ALL: [Side; 3] = [Side::Base, Side::Local, Side::Other];

    pub fn name(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Local => "local",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// The steps of a merge, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    FastPath,
    Canonicalize,
    ExtractChanges,
    Classify,
    Assemble,
    Template,
    Header,
    Serialize,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Self::FastPath => "fast-path",
            Self::Canonicalize => "canonicalize",
            Self::ExtractChanges => "extract-changes",
            Self::Classify => "classify",
            Self::Assemble => "assemble",
            Self::Template => "template",
            Self::Header => "header",
            Self::Serialize => "serialize",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// StageRecord
// ---------------------------------------------------------------------------

/// Recorded timing of a completed stage. Timings are diagnostic only and
/// never influence the merge result.
#[derive(Clone, Debug)]
pub struct StageRecord {
    pub stage: Stage,
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_names() {
        let names: Vec<String> = Side::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["base", "local", "other"]);
    }

    #[test]
    fn stage_serde_uses_kebab_case() {
        let json = serde_json::to_string(&Stage::ExtractChanges).unwrap();
        assert_eq!(json, "\"extract-changes\"");
        assert_eq!(Stage::FastPath.to_string(), "fast-path");
    }
}
