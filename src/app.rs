//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - loads the source configuration
//! - runs the aggregation pipeline
//! - writes the reports and prints a run summary

use std::path::Path;

use chrono::Local;
use clap::Parser;
use tracing::{debug, info};

use crate::cli::Cli;
use crate::config::Config;
use crate::data::FeedClient;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `ozh` binary.
pub fn run() -> Result<(), AppError> {
    // Allow OZH_* settings to come from a local .env file.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    crate::logging::init(cli.log_filter());

    if cli.init_config {
        return write_default_config(&cli.config);
    }

    info!("ozh v{}", env!("CARGO_PKG_VERSION"));
    debug!(?cli, "arguments");

    let mut config = Config::load(&cli.config)?;
    if let Some(dir) = &cli.output_dir {
        config.output.dir = dir.clone();
    }
    let today = cli.as_of.unwrap_or_else(|| Local::now().date_naive());
    info!(
        config = %cli.config.display(),
        regions = config.sources.len(),
        %today,
        "starting run"
    );

    let run = pipeline::run_pipeline(&config, &FeedClient::new(), today)?;
    let written = pipeline::write_reports(&config, &run)?;

    println!(
        "{}",
        crate::report::format_run_summary(&run.aligned, &run.digest, &run.regions, &run.skipped)
    );
    println!("{}", crate::report::format::format_written(&written));

    Ok(())
}

fn write_default_config(path: &Path) -> Result<(), AppError> {
    if path.exists() {
        return Err(AppError::config(format!(
            "{} already exists; remove it first or edit it manually",
            path.display()
        )));
    }
    std::fs::write(path, Config::default_toml())
        .map_err(|e| AppError::config(format!("failed to write {}: {e}", path.display())))?;
    println!("Created {} with default settings.", path.display());
    Ok(())
}
