//! Command-line parsing for the credit-risk source normalizer.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! normalization code. Every command turns into a config struct in `app`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::SourceKind;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "cprep", version, about = "Normalize credit-risk source tables into the canonical training schema")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Normalize one source file and write canonical.csv, feature_order.json and report.json.
    Normalize(NormalizeArgs),
    /// Normalize several source files (in parallel) and write one merged canonical CSV.
    Merge(MergeArgs),
}

/// Row-cap options shared by all commands.
#[derive(Debug, Args, Clone)]
pub struct SamplingArgs {
    /// Keep at most this many rows of each LendingClub source (0 disables the cap).
    #[arg(long = "max-rows", env = "CPREP_MAX_ROWS", default_value_t = 250_000)]
    pub max_rows: usize,

    /// Seed for the row-cap sample (same seed, same rows).
    #[arg(long, env = "CPREP_SEED", default_value_t = 42)]
    pub seed: u64,
}

#[derive(Debug, Parser, Clone)]
pub struct NormalizeArgs {
    /// Which dataset family the file comes from.
    #[arg(short = 's', long, value_enum)]
    pub source: SourceKind,

    /// Source file: CSV, or an Excel workbook (`.xls`/`.xlsx`, first sheet).
    #[arg(long, value_name = "FILE")]
    pub data: PathBuf,

    /// Output directory.
    #[arg(long, default_value = "./artifacts")]
    pub out: PathBuf,

    /// Number of records above the header to skip (default: 0 for CSV, 1 for Excel).
    #[arg(long = "header-row")]
    pub header_row: Option<usize>,

    #[command(flatten)]
    pub sampling: SamplingArgs,
}

#[derive(Debug, Parser, Clone)]
pub struct MergeArgs {
    /// Source to include, as `KIND=FILE` (repeatable; order is kept in the output).
    #[arg(long = "input", value_name = "KIND=FILE", required = true, value_parser = parse_source_input)]
    pub inputs: Vec<SourceInput>,

    /// Merged canonical CSV to write (feature_order.json and report.json go next to it).
    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,

    #[command(flatten)]
    pub sampling: SamplingArgs,
}

/// One `KIND=FILE` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInput {
    pub kind: SourceKind,
    pub path: PathBuf,
}

pub fn parse_source_input(s: &str) -> Result<SourceInput, String> {
    let (kind, path) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KIND=FILE, got '{s}'"))?;
    let kind: SourceKind = kind.parse().map_err(|e| format!("{e}"))?;
    let path = path.trim();
    if path.is_empty() {
        return Err(format!("missing file path in '{s}'"));
    }
    Ok(SourceInput {
        kind,
        path: PathBuf::from(path),
    })
}
