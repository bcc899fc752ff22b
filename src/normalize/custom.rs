//! Pass-through mapper for tables that already use the canonical schema.

use crate::domain::{CANONICAL_COLUMNS, RawTable};
use crate::error::SchemaError;
use crate::normalize::assemble::Draft;
use crate::normalize::{Mapped, SourceNotes, require_columns};

pub fn map_custom(raw: &RawTable) -> Result<Mapped, SchemaError> {
    let cols = require_columns(raw, "custom", &CANONICAL_COLUMNS)?;
    let (age, income, liabilities, months, target) = (cols[0], cols[1], cols[2], cols[3], cols[4]);

    let drafts = (0..raw.n_rows())
        .map(|row| Draft {
            age: age.get(row).as_f64(),
            income: income.get(row).as_f64(),
            liabilities: liabilities.get(row).as_f64(),
            credit_history_months: months.get(row).as_f64(),
            target: target.get(row).as_label(),
        })
        .collect();

    Ok(Mapped {
        drafts,
        notes: SourceNotes::default(),
    })
}
