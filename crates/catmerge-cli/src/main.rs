use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

mod cli;
mod commands;
mod config;
mod driver;
mod report;

use driver::ExitStatus;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    let result = config::DriverConfig::load(cli.config.as_deref()).and_then(|config| {
        let config = config.with_verbosity(cli.verbosity);
        init_tracing(config.verbosity);
        commands::run_command(cli, config)
    });

    match result {
        Ok(status) => status.into(),
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitStatus::from_error(&err).into()
        }
    }
}

/// Diagnostics go to stderr. Verbosity 3 turns on timestamped debug
/// progress; below that only warnings and errors are shown.
fn init_tracing(verbosity: u8) {
    let builder = tracing_subscriber::fmt().with_writer(std::io::stderr);
    if verbosity >= 3 {
        builder.with_max_level(tracing::Level::DEBUG).init();
    } else {
        builder
            .with_max_level(tracing::Level::WARN)
            .without_time()
            .with_target(false)
            .init();
    }
}
