use std::io;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::debug;

use enroll_cli::cli::Cli;
use enroll_cli::config::EnrollConfig;
use enroll_cli::{app, logging};

// ─── logging ─────────────────────────────────────────────────────────────────

/// Install the subscriber, then apply the CLI's runtime adjustments.
fn init_tracing(
    cli: &Cli,
    config: &EnrollConfig,
) -> anyhow::Result<()> {
    logging::init_logging(&config.logging.level);
    if cli.verbose {
        logging::set_log_level("debug")?;
    }
    if cli.quiet {
        logging::set_console_enabled(false)?;
    }
    if let Some(path) = &config.logging.file {
        logging::enable_file_logging(path)?;
    }
    Ok(())
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = EnrollConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config.apply_overrides(cli.backend.as_deref(), cli.location.as_deref());

    init_tracing(&cli, &config)?;
    debug!(?config, "configuration resolved");

    let outcome = app::execute(cli.command, &config, &mut io::stdout().lock()).await?;

    Ok(outcome.exit_code())
}
