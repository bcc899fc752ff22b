//! Shared "normalize" pipeline used by both CLI commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! file ingest -> dispatch to the source mapper -> canonical assembly
//!
//! The commands can then focus on where outputs go.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::app::config::MergeConfig;
use crate::cli::SourceInput;
use crate::domain::{CanonicalTable, SourceKind};
use crate::error::AppError;
use crate::io::{IngestOptions, load_raw_table};
use crate::normalize::{NormalizeOptions, NormalizeReport, normalize};

/// Outputs of normalizing one source file.
#[derive(Debug, Clone)]
pub struct SourceRun {
    pub path: PathBuf,
    pub table: CanonicalTable,
    pub report: NormalizeReport,
    /// CSV records that could not be read at all.
    pub unreadable_records: usize,
}

/// Outputs of a merge run.
#[derive(Debug, Clone)]
pub struct MergeOutput {
    pub runs: Vec<SourceRun>,
    pub merged: CanonicalTable,
}

/// Load and normalize one file.
pub fn run_source(
    path: &Path,
    kind: SourceKind,
    ingest: &IngestOptions,
    options: &NormalizeOptions,
) -> Result<SourceRun, AppError> {
    let ingested = load_raw_table(path, ingest)?;
    let normalized = normalize(&ingested.table, kind, options)
        .map_err(|e| AppError::new(2, format!("{}: {e}", path.display())))?;

    Ok(SourceRun {
        path: path.to_path_buf(),
        table: normalized.table,
        report: normalized.report,
        unreadable_records: ingested.row_errors.len(),
    })
}

/// Normalize every input independently (in parallel) and concatenate the
/// results in input order.
pub fn run_merge(config: &MergeConfig) -> Result<MergeOutput, AppError> {
    let runs = config
        .inputs
        .par_iter()
        .map(|input: &SourceInput| run_source(&input.path, input.kind, &IngestOptions::default(), &config.normalize))
        .collect::<Result<Vec<_>, AppError>>()?;

    let merged = CanonicalTable::concat(runs.iter().map(|r| r.table.clone()));

    Ok(MergeOutput { runs, merged })
}
