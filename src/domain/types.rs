//! Shared domain types.
//!
//! The canonical schema is the contract with the training and serving steps:
//! both build feature vectors in `FEATURE_ORDER`, so the order is fixed here
//! and nowhere else.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::table::{Cell, RawColumn, RawTable};
use crate::error::ConfigError;

/// The four model features, in the order every consumer must use.
pub const FEATURE_ORDER: [&str; 4] = ["age", "income", "liabilities", "credit_history_months"];

/// Binary 12-month default outcome.
pub const TARGET_COLUMN: &str = "target_default_12m";

/// Full canonical header (features then target).
pub const CANONICAL_COLUMNS: [&str; 5] = [
    "age",
    "income",
    "liabilities",
    "credit_history_months",
    TARGET_COLUMN,
];

/// Which dataset family a raw table comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// UCI "default of credit card clients" (Taiwan) export.
    Taiwan,
    /// LendingClub accepted-loans export.
    #[value(name = "lendingclub")]
    LendingClub,
    /// Table that already carries the five canonical columns.
    Custom,
}

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [SourceKind::Taiwan, SourceKind::LendingClub, SourceKind::Custom];

    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Taiwan => "taiwan",
            SourceKind::LendingClub => "lendingclub",
            SourceKind::Custom => "custom",
        }
    }

    /// Inclusive `age` bounds applied for this source.
    pub fn age_bounds(self) -> (f64, f64) {
        match self {
            SourceKind::Taiwan => (18.0, 100.0),
            SourceKind::LendingClub => (18.0, 80.0),
            SourceKind::Custom => (18.0, 120.0),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        SourceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == key)
            .ok_or_else(|| ConfigError::UnsupportedKind(s.to_string()))
    }
}

/// One training example in the canonical schema.
///
/// Field order matches `CANONICAL_COLUMNS`; the CSV writer relies on it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRow {
    pub age: f64,
    pub income: f64,
    pub liabilities: f64,
    pub credit_history_months: f64,
    pub target_default_12m: u8,
}

impl CanonicalRow {
    pub fn features(&self) -> [f64; 4] {
        [self.age, self.income, self.liabilities, self.credit_history_months]
    }
}

/// Output of one normalization run. Never mutated after assembly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalTable {
    rows: Vec<CanonicalRow>,
}

impl CanonicalTable {
    pub fn new(rows: Vec<CanonicalRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[CanonicalRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> [&'static str; 5] {
        CANONICAL_COLUMNS
    }

    /// Row-major feature matrix in `FEATURE_ORDER`.
    pub fn feature_matrix(&self) -> Vec<[f64; 4]> {
        self.rows.iter().map(CanonicalRow::features).collect()
    }

    pub fn targets(&self) -> Vec<u8> {
        self.rows.iter().map(|r| r.target_default_12m).collect()
    }

    /// Share of rows labelled as defaults; `None` for an empty table.
    pub fn default_rate(&self) -> Option<f64> {
        if self.rows.is_empty() {
            return None;
        }
        let defaults = self.rows.iter().filter(|r| r.target_default_12m == 1).count();
        Some(defaults as f64 / self.rows.len() as f64)
    }

    /// Concatenate tables, keeping the order in which they are given.
    pub fn concat<I>(tables: I) -> Self
    where
        I: IntoIterator<Item = CanonicalTable>,
    {
        let rows = tables.into_iter().flat_map(|t| t.rows).collect();
        Self { rows }
    }

    /// View the canonical table as a raw table (e.g. to feed it back through
    /// the custom mapper).
    pub fn to_raw_table(&self) -> RawTable {
        let rows = &self.rows;
        RawTable::new(vec![
            numeric_column(rows, "age", |r| r.age),
            numeric_column(rows, "income", |r| r.income),
            numeric_column(rows, "liabilities", |r| r.liabilities),
            numeric_column(rows, "credit_history_months", |r| r.credit_history_months),
            numeric_column(rows, TARGET_COLUMN, |r| f64::from(r.target_default_12m)),
        ])
    }
}

fn numeric_column(rows: &[CanonicalRow], name: &str, value: fn(&CanonicalRow) -> f64) -> RawColumn {
    RawColumn::new(name, rows.iter().map(|r| Cell::Number(value(r))).collect())
}
