use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use catmerge_catalog::{HeaderFormat, WriteOptions};
use catmerge_merge::MergeOptions;

use crate::cli::{MergeArgs, WriteArgs};

/// Driver configuration. Read from an optional TOML file; command-line
/// flags take precedence.
///
/// ```toml
/// verbosity = 1
///
/// [merge]
/// fast_path = "git"
///
/// [merge.labels]
/// local = "ours"
///
/// [merge.write]
/// width = 100
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub verbosity: u8,
    pub merge: MergeOptions,
}

impl DriverConfig {
    /// Load from `path`, or defaults when no file is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn with_verbosity(mut self, verbosity: Option<u8>) -> Self {
        if let Some(v) = verbosity {
            self.verbosity = v;
        }
        self
    }

    /// Apply the `merge` command's flags.
    pub fn apply_merge_args(&mut self, args: &MergeArgs) {
        let merge = &mut self.merge;
        if let Some(strategy) = args.fast_path {
            merge.fast_path = strategy.into();
        }
        if args.no_fallback {
            merge.allow_builtin_fallback = false;
        }
        if let Some(label) = &args.local_label {
            merge.labels.local.clone_from(label);
        }
        if let Some(label) = &args.other_label {
            merge.labels.other.clone_from(label);
        }
        apply_write_args(&mut merge.write, &args.write);
    }
}

/// Overlay formatting flags onto configured write options.
pub fn apply_write_args(write: &mut WriteOptions, args: &WriteArgs) {
    if args.no_wrap {
        write.no_wrap = true;
    }
    if let Some(width) = args.width {
        write.width = width;
    }
    if args.sort_output {
        write.sort_output = true;
    }
    if args.canonical_header {
        write.header_format = HeaderFormat::Canonical;
    }
}
