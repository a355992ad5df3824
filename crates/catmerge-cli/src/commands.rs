use std::io::Write;

use anyhow::Context;
use colored::Colorize;

use catmerge_catalog::{encode_catalog, Catalog};

use crate::cli::*;
use crate::config::{apply_write_args, DriverConfig};
use crate::driver::{scan, Driver, ExitStatus, MergeRequest};
use crate::report::Reporter;

pub fn run_command(cli: Cli, config: DriverConfig) -> anyhow::Result<ExitStatus> {
    let format = cli.format;
    match cli.command {
        Command::Merge(args) => cmd_merge(args, config, format),
        Command::Check(args) => cmd_check(args, format),
        Command::Normalize(args) => cmd_normalize(args, config),
    }
}

fn cmd_merge(
    args: MergeArgs,
    mut config: DriverConfig,
    format: OutputFormat,
) -> anyhow::Result<ExitStatus> {
    config.apply_merge_args(&args);
    let display = args
        .path
        .clone()
        .unwrap_or_else(|| args.local.display().to_string());
    let request = MergeRequest {
        base: args.base,
        local: args.local,
        other: args.other,
        display,
    };

    let reporter = Reporter::new(config.verbosity, format);
    reporter.file_header(&request.display);

    let labels = config.merge.labels.clone();
    let driver = Driver::new(config.merge);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    let outcome = runtime
        .block_on(driver.merge(&request))
        .with_context(|| format!("merging {}", request.display))?;

    tracing::debug!(status = ?outcome.status, path = ?outcome.path, "merge finished");
    reporter.outcome(&outcome, &labels)?;
    Ok(outcome.status)
}

fn cmd_check(args: CheckArgs, format: OutputFormat) -> anyhow::Result<ExitStatus> {
    let content = std::fs::read(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let (keys, marked) = scan(&content);

    match format {
        OutputFormat::Json => {
            let keys: Vec<String> = keys.iter().map(ToString::to_string).collect();
            println!("{}", serde_json::to_string_pretty(&keys)?);
        }
        OutputFormat::Text if marked => {
            for key in &keys {
                println!("{} {}", "conflict:".red().bold(), key);
            }
            if keys.is_empty() {
                println!("{} conflict markers in {}", "✗".red(), args.file.display());
            }
        }
        OutputFormat::Text => println!("{} no conflicts", "✓".green()),
    }

    Ok(if marked {
        ExitStatus::Conflicts
    } else {
        ExitStatus::Clean
    })
}

fn cmd_normalize(args: NormalizeArgs, config: DriverConfig) -> anyhow::Result<ExitStatus> {
    let catalog = Catalog::read(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?
        .canonicalize();

    let mut options = config.merge.write;
    apply_write_args(&mut options, &args.write);
    let bytes = encode_catalog(&catalog, &options)?;

    match &args.output {
        Some(path) => std::fs::write(path, bytes)
            .with_context(|| format!("writing {}", path.display()))?,
        None => std::io::stdout()
            .lock()
            .write_all(&bytes)
            .context("writing to stdout")?,
    }
    Ok(ExitStatus::Clean)
}
