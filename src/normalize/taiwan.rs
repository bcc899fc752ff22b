//! Taiwan (UCI "default of credit card clients") mapper.

use tracing::info;

use crate::domain::RawTable;
use crate::error::SchemaError;
use crate::normalize::assemble::Draft;
use crate::normalize::label::resolve_label_column;
use crate::normalize::{Mapped, SourceNotes, require_columns};

pub const REQUIRED_COLUMNS: [&str; 2] = ["AGE", "LIMIT_BAL"];
pub const BILL_PREFIX: &str = "BILL_AMT";

/// Months of history assumed whenever billing columns exist. A fixed proxy,
/// not a measurement; downstream metrics were computed against this value.
pub const BILL_HISTORY_MONTHS: f64 = 6.0;

pub fn map_taiwan(raw: &RawTable) -> Result<Mapped, SchemaError> {
    let required = require_columns(raw, "taiwan", &REQUIRED_COLUMNS)?;
    let (age, limit) = (required[0], required[1]);

    let label_name = resolve_label_column(&raw.column_names())?;
    let label = raw
        .columns()
        .iter()
        .find(|c| c.name == label_name)
        .ok_or_else(|| SchemaError::LabelNotFound {
            available: raw.column_names(),
        })?;
    info!(label_column = %label_name, "resolved Taiwan label column");

    let bills = raw.columns_with_prefix(BILL_PREFIX);
    let history = if bills.is_empty() { 0.0 } else { BILL_HISTORY_MONTHS };

    let drafts = (0..raw.n_rows())
        .map(|row| {
            let liabilities = if bills.is_empty() {
                0.0
            } else {
                // An unreadable bill amount counts as zero in the mean.
                let sum: f64 = bills.iter().map(|c| c.get(row).as_f64().unwrap_or(0.0)).sum();
                sum / bills.len() as f64
            };

            Draft {
                age: age.get(row).as_f64(),
                income: limit.get(row).as_f64(),
                liabilities: Some(liabilities),
                credit_history_months: Some(history),
                target: label.get(row).as_label(),
            }
        })
        .collect();

    Ok(Mapped {
        drafts,
        notes: SourceNotes {
            label_column: Some(label_name),
            bill_columns: Some(bills.len()),
            ..SourceNotes::default()
        },
    })
}
