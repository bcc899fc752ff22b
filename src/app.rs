//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` defaults and parses CLI arguments
//! - runs the normalization pipeline
//! - prints the summary
//! - writes the canonical CSV, feature-order manifest and report

use std::fs::create_dir_all;

use clap::Parser;
use tracing::info;

use crate::app::config::{MergeConfig, PrepConfig};
use crate::cli::{Command, MergeArgs, NormalizeArgs};
use crate::error::AppError;

pub mod config;
pub mod pipeline;

/// Entry point for the `cprep` binary.
pub fn run() -> Result<(), AppError> {
    // Environment defaults (`CPREP_MAX_ROWS`, `CPREP_SEED`) may live in `.env`.
    dotenvy::dotenv().ok();
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Normalize(args) => handle_normalize(&args),
        Command::Merge(args) => handle_merge(&args),
    }
}

fn handle_normalize(args: &NormalizeArgs) -> Result<(), AppError> {
    let config = PrepConfig::from_args(args);
    let run = pipeline::run_source(&config.data_path, config.source, &config.ingest, &config.normalize)?;

    println!("{}", crate::report::format_source_summary(&run));

    if run.table.is_empty() {
        return Err(AppError::new(
            3,
            "No valid rows remain after normalization.",
        ));
    }

    create_dir_all(&config.out_dir).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create output directory '{}': {e}", config.out_dir.display()),
        )
    })?;
    crate::io::write_canonical_csv(&config.canonical_path(), &run.table)?;
    crate::io::write_feature_order(&config.feature_order_path())?;
    crate::io::write_report_json(&config.report_path(), &run.report)?;

    info!(out_dir = %config.out_dir.display(), rows = run.table.len(), "wrote canonical table");
    Ok(())
}

fn handle_merge(args: &MergeArgs) -> Result<(), AppError> {
    let config = MergeConfig::from_args(args);
    let output = pipeline::run_merge(&config)?;

    println!("{}", crate::report::format_merge_summary(&output));

    if output.merged.is_empty() {
        return Err(AppError::new(
            3,
            "No valid rows remain after normalizing every input.",
        ));
    }

    if let Some(parent) = config.out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent).map_err(|e| {
            AppError::new(2, format!("Failed to create output directory '{}': {e}", parent.display()))
        })?;
    }
    crate::io::write_canonical_csv(&config.out_path, &output.merged)?;
    crate::io::write_feature_order(&config.feature_order_path())?;

    let reports: Vec<_> = output.runs.iter().map(|r| &r.report).collect();
    crate::io::write_report_json(&config.report_path(), &reports)?;

    info!(out = %config.out_path.display(), rows = output.merged.len(), "wrote merged canonical table");
    Ok(())
}
