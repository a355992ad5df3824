use serde::{Deserialize, Serialize};

use catmerge_catalog::WriteOptions;

/// How the line-oriented fast path is attempted before the semantic merge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FastPathStrategy {
    /// In-process diff3.
    #[default]
    Builtin,
    /// `git merge-file`, run on copies in the working area.
    Git,
    /// Always run the semantic merge.
    Off,
}

/// Branch labels written into conflict markers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConflictLabels {
    pub local: String,
    pub other: String,
}

impl Default for ConflictLabels {
    fn default() -> Self {
        Self {
            local: "local".into(),
            other: "other".into(),
        }
    }
}

/// Configuration for a single merge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
    /// Fast-path strategy.
    pub fast_path: FastPathStrategy,
    /// When the configured fast-path tool is missing, use the builtin line
    /// merge instead of failing.
    pub allow_builtin_fallback: bool,
    /// Labels for conflict markers.
    pub labels: ConflictLabels,
    /// Output formatting of the semantic merge result.
    pub write: WriteOptions,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            fast_path: FastPathStrategy::default(),
            allow_builtin_fallback: true,
            labels: ConflictLabels::default(),
            write: WriteOptions::default(),
        }
    }
}

impl MergeOptions {
    /// Options that skip the fast path, so every merge goes through the
    /// entry-aware pipeline.
    pub fn semantic_only() -> Self {
        Self {
            fast_path: FastPathStrategy::Off,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catmerge_catalog::HeaderFormat;

    #[test]
    fn default_options() {
        let options = MergeOptions::default();
        assert_eq!(options.fast_path, FastPathStrategy::Builtin);
        assert!(options.allow_builtin_fallback);
        assert_eq!(options.labels.local, "local");
        assert_eq!(options.labels.other, "other");
        assert_eq!(options.write.width, 79);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let options: MergeOptions = toml::from_str(
            r#"
            fast_path = "git"
            allow_builtin_fallback = false

            [labels]
            other = "upstream"

            [write]
            no_wrap = true
            header_format = "canonical"
            "#,
        )
        .unwrap();
        assert_eq!(options.fast_path, FastPathStrategy::Git);
        assert!(!options.allow_builtin_fallback);
        assert_eq!(options.labels.local, "local");
        assert_eq!(options.labels.other, "upstream");
        assert!(options.write.no_wrap);
        assert_eq!(options.write.width, 79);
        assert_eq!(options.write.header_format, HeaderFormat::Canonical);
    }

    #[test]
    fn semantic_only_disables_fast_path() {
        assert_eq!(MergeOptions::semantic_only().fast_path, FastPathStrategy::Off);
    }
}
