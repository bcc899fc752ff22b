//! Source normalization: `RawTable` + `SourceKind` -> `CanonicalTable`.
//!
//! Pipeline per call:
//!
//! 1. the mapper for the source kind checks its schema and derives per-row drafts
//! 2. the assembler applies the source's bounds and drop policy
//! 3. for LendingClub, an optional row cap samples the survivors deterministically
//!
//! `normalize` is the single entry point; everything here is synchronous and
//! free of shared mutable state, so callers may run it on several tables at once.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::{CanonicalTable, RawColumn, RawTable, SourceKind};
use crate::error::{NormalizeError, SchemaError};

pub mod assemble;
pub mod custom;
pub mod label;
pub mod lendingclub;
pub mod status;
pub mod taiwan;

use assemble::{AssemblyPolicy, Draft, DropCounts, LabelPolicy, assemble};

/// Seed used for row-cap sampling unless the caller picks another.
pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Keep at most this many LendingClub rows (`None` or `Some(0)` keeps all).
    /// Taiwan and custom tables are never capped.
    pub row_cap: Option<usize>,
    /// Seed for the row-cap sample.
    pub seed: u64,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            row_cap: None,
            seed: DEFAULT_SEED,
        }
    }
}

/// Mapper output before assembly.
#[derive(Debug, Clone)]
pub struct Mapped {
    pub drafts: Vec<Draft>,
    pub notes: SourceNotes,
}

/// Source-specific facts worth reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceNotes {
    pub label_column: Option<String>,
    pub bill_columns: Option<usize>,
    pub unmapped_statuses: BTreeMap<String, usize>,
}

/// What happened during one normalization run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizeReport {
    pub source: SourceKind,
    pub rows_in: usize,
    pub rows_out: usize,
    pub dropped: DropCounts,
    pub capped_out: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bill_columns: Option<usize>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub unmapped_statuses: BTreeMap<String, usize>,
}

#[derive(Debug, Clone)]
pub struct Normalized {
    pub table: CanonicalTable,
    pub report: NormalizeReport,
}

/// Normalize `raw` as a `kind` table.
pub fn normalize(raw: &RawTable, kind: SourceKind, options: &NormalizeOptions) -> Result<Normalized, NormalizeError> {
    let mapped = match kind {
        SourceKind::Taiwan => taiwan::map_taiwan(raw)?,
        SourceKind::LendingClub => lendingclub::map_lendingclub(raw)?,
        SourceKind::Custom => custom::map_custom(raw)?,
    };

    let policy = assembly_policy(kind);
    let assembled = assemble(&mapped.drafts, &policy, row_cap_for(kind, options), options.seed);

    let report = NormalizeReport {
        source: kind,
        rows_in: raw.n_rows(),
        rows_out: assembled.table.len(),
        dropped: assembled.dropped,
        capped_out: assembled.capped_out,
        label_column: mapped.notes.label_column,
        bill_columns: mapped.notes.bill_columns,
        unmapped_statuses: mapped.notes.unmapped_statuses,
    };

    if report.dropped.total() > 0 {
        warn!(
            source = %kind,
            missing_value = report.dropped.missing_value,
            non_finite = report.dropped.non_finite,
            label_out_of_range = report.dropped.label_out_of_range,
            "dropped rows that could not be resolved"
        );
    }
    info!(
        source = %kind,
        rows_in = report.rows_in,
        rows_out = report.rows_out,
        capped_out = report.capped_out,
        "normalized source table"
    );

    Ok(Normalized {
        table: assembled.table,
        report,
    })
}

/// Like `normalize`, but takes the source kind as a string. An unknown kind
/// fails before the table is touched.
pub fn normalize_named(raw: &RawTable, kind: &str, options: &NormalizeOptions) -> Result<Normalized, NormalizeError> {
    let kind: SourceKind = kind.parse()?;
    normalize(raw, kind, options)
}

fn assembly_policy(kind: SourceKind) -> AssemblyPolicy {
    let (age_min, age_max) = kind.age_bounds();
    let label = match kind {
        // A custom table is assumed pre-validated: clip labels rather than drop.
        SourceKind::Custom => LabelPolicy::Clamp,
        SourceKind::Taiwan | SourceKind::LendingClub => LabelPolicy::Strict,
    };
    AssemblyPolicy { age_min, age_max, label }
}

/// Only LendingClub exports are large enough to be subsampled; the other
/// sources always keep every surviving row.
fn row_cap_for(kind: SourceKind, options: &NormalizeOptions) -> Option<usize> {
    match kind {
        SourceKind::LendingClub => options.row_cap,
        SourceKind::Taiwan | SourceKind::Custom => None,
    }
}

/// Look up every required column, failing with the full list of missing
/// names. Returned columns follow the order of `required`.
pub(crate) fn require_columns<'a>(
    raw: &'a RawTable,
    source_name: &'static str,
    required: &[&str],
) -> Result<Vec<&'a RawColumn>, SchemaError> {
    let found: Vec<Option<&RawColumn>> = required.iter().map(|name| raw.find(name)).collect();
    if found.iter().any(Option::is_none) {
        return Err(SchemaError::MissingColumns {
            source_name,
            missing: raw.missing_columns(required),
            available: raw.column_names(),
        });
    }
    Ok(found.into_iter().flatten().collect())
}
