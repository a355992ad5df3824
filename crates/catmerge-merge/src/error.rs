use std::path::PathBuf;

use catmerge_catalog::CatalogError;

use crate::stage::{Side, Stage};

/// Errors that abort a merge. An unresolved conflict is not an error; it is
/// reported through [`crate::MergeOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// One of the input catalogs could not be parsed.
    #[error("malformed {side} catalog: {source}")]
    Parse {
        side: Side,
        #[source]
        source: CatalogError,
    },

    /// An input path does not name a readable file.
    #[error("{side} catalog {} is not a readable file", path.display())]
    MissingInput { side: Side, path: PathBuf },

    /// An external tool the configured strategy needs is unavailable.
    #[error("required tool '{tool}' is unavailable: {message}")]
    DependencyMissing { tool: String, message: String },

    /// A stage failed or found a broken invariant.
    #[error("stage error in '{stage}': {message}")]
    Stage { stage: Stage, message: String },

    /// Working-area I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MergeError {
    /// Create a stage error with a message.
    pub fn stage(stage: Stage, message: impl Into<String>) -> Self {
        Self::Stage {
            stage,
            message: message.into(),
        }
    }

    /// The input the error is attributed to.
    pub fn side(&self) -> Option<Side> {
        match self {
            Self::Parse { side, .. } | Self::MissingInput { side, .. } => Some(*side),
            _ => None,
        }
    }
}

/// Convenience alias for merge results.
pub type Result<T> = std::result::Result<T, MergeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_names_side() {
        let err = MergeError::Parse {
            side: Side::Other,
            source: CatalogError::parse(3, "unterminated string"),
        };
        assert_eq!(err.side(), Some(Side::Other));
        assert_eq!(
            err.to_string(),
            "malformed other catalog: line 3: unterminated string"
        );
    }

    #[test]
    fn missing_input_names_side_and_path() {
        let err = MergeError::MissingInput {
            side: Side::Base,
            path: PathBuf::from("/tmp/absent.po"),
        };
        assert_eq!(err.side(), Some(Side::Base));
        assert_eq!(
            err.to_string(),
            "base catalog /tmp/absent.po is not a readable file"
        );
    }

    #[test]
    fn stage_error_display() {
        let err = MergeError::stage(Stage::Template, "key missing");
        assert_eq!(err.to_string(), "stage error in 'template': key missing");
        assert_eq!(err.side(), None);
    }
}
