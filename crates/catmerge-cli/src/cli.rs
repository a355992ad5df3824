use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use catmerge_merge::FastPathStrategy;

#[derive(Parser)]
#[command(
    name = "catmerge",
    about = "catmerge: three-way merge driver for gettext translation catalogs",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// 0 = failures only, 1 = per-file header, 2 = conflict excerpt,
    /// 3 = timestamped internal progress
    #[arg(short, long, global = true, env = "CATMERGE_VERBOSITY")]
    pub verbosity: Option<u8>,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Merge OTHER into LOCAL using BASE as the ancestor (git merge driver)
    Merge(MergeArgs),
    /// Report unresolved conflict markers in a catalog
    Check(CheckArgs),
    /// Deduplicate and re-serialize a catalog
    Normalize(NormalizeArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum FastPathArg {
    Builtin,
    Git,
    Off,
}

impl From<FastPathArg> for FastPathStrategy {
    fn from(arg: FastPathArg) -> Self {
        match arg {
            FastPathArg::Builtin => Self::Builtin,
            FastPathArg::Git => Self::Git,
            FastPathArg::Off => Self::Off,
        }
    }
}

/// Output formatting flags shared by commands that write catalogs.
#[derive(Args, Clone, Debug, Default)]
pub struct WriteArgs {
    /// Never wrap long strings
    #[arg(long)]
    pub no_wrap: bool,
    /// Wrap width for long strings
    #[arg(long)]
    pub width: Option<usize>,
    /// Sort entries by key
    #[arg(long)]
    pub sort_output: bool,
    /// Reorder header fields into the standard gettext order
    #[arg(long)]
    pub canonical_header: bool,
}

#[derive(Args)]
pub struct MergeArgs {
    /// Common ancestor (%O)
    pub base: PathBuf,
    /// Current branch, overwritten with the result (%A)
    pub local: PathBuf,
    /// Incoming branch (%B)
    pub other: PathBuf,
    /// Logical file name, for messages only (%P)
    pub path: Option<String>,

    #[arg(long, value_enum)]
    pub fast_path: Option<FastPathArg>,
    /// Fail instead of using the builtin line merge when git is missing
    #[arg(long)]
    pub no_fallback: bool,
    #[arg(long)]
    pub local_label: Option<String>,
    #[arg(long)]
    pub other_label: Option<String>,

    #[command(flatten)]
    pub write: WriteArgs,
}

#[derive(Args)]
pub struct CheckArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct NormalizeArgs {
    pub file: PathBuf,
    /// Write here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub write: WriteArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_merge_driver_invocation() {
        let cli = Cli::try_parse_from(["catmerge", "merge", "O", "A", "B", "po/de.po"]).unwrap();
        if let Command::Merge(args) = cli.command {
            assert_eq!(args.base, PathBuf::from("O"));
            assert_eq!(args.local, PathBuf::from("A"));
            assert_eq!(args.other, PathBuf::from("B"));
            assert_eq!(args.path.as_deref(), Some("po/de.po"));
            assert!(args.fast_path.is_none());
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_merge_without_path() {
        let cli = Cli::try_parse_from(["catmerge", "merge", "O", "A", "B"]).unwrap();
        if let Command::Merge(args) = cli.command {
            assert!(args.path.is_none());
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_merge_flags() {
        let cli = Cli::try_parse_from([
            "catmerge", "merge", "--fast-path", "git", "--no-fallback", "--no-wrap",
            "--width", "100", "--sort-output", "--canonical-header",
            "--local-label", "ours", "--other-label", "theirs", "O", "A", "B",
        ])
        .unwrap();
        if let Command::Merge(args) = cli.command {
            assert_eq!(args.fast_path, Some(FastPathArg::Git));
            assert!(args.no_fallback);
            assert!(args.write.no_wrap);
            assert_eq!(args.write.width, Some(100));
            assert!(args.write.sort_output);
            assert!(args.write.canonical_header);
            assert_eq!(args.local_label.as_deref(), Some("ours"));
            assert_eq!(args.other_label.as_deref(), Some("theirs"));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_merge_requires_three_files() {
        assert!(Cli::try_parse_from(["catmerge", "merge", "O", "A"]).is_err());
    }

    #[test]
    fn parse_check() {
        let cli = Cli::try_parse_from(["catmerge", "check", "de.po"]).unwrap();
        assert!(matches!(cli.command, Command::Check(_)));
    }

    #[test]
    fn parse_normalize_output() {
        let cli = Cli::try_parse_from(["catmerge", "normalize", "de.po", "-o", "out.po"]).unwrap();
        if let Command::Normalize(args) = cli.command {
            assert_eq!(args.output, Some(PathBuf::from("out.po")));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_verbosity() {
        let cli = Cli::try_parse_from(["catmerge", "-v", "2", "check", "de.po"]).unwrap();
        assert_eq!(cli.verbosity, Some(2));
    }

    #[test]
    fn parse_json_format() {
        let cli = Cli::try_parse_from(["catmerge", "--format", "json", "check", "x.po"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn fast_path_arg_maps_to_strategy() {
        assert_eq!(FastPathStrategy::from(FastPathArg::Off), FastPathStrategy::Off);
        assert_eq!(FastPathStrategy::from(FastPathArg::Builtin), FastPathStrategy::Builtin);
    }
}
