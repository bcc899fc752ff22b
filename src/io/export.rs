//! Write the canonical table and its companions to disk.
//!
//! - `canonical.csv`: header is exactly `CANONICAL_COLUMNS`
//! - `feature_order.json`: `FEATURE_ORDER`, read by training and serving
//! - `report.json`: one `NormalizeReport` per normalized source

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::domain::{CanonicalTable, FEATURE_ORDER};
use crate::error::AppError;

/// Write the canonical table as CSV.
pub fn write_canonical_csv(path: &Path, table: &CanonicalTable) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create canonical CSV '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);

    if table.is_empty() {
        // `serialize` derives the header from the first row, so an empty
        // table needs it written by hand.
        writer
            .write_record(table.columns())
            .map_err(|e| AppError::new(2, format!("Failed to write canonical CSV header: {e}")))?;
    }
    for row in table.rows() {
        writer
            .serialize(row)
            .map_err(|e| AppError::new(2, format!("Failed to write canonical CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush canonical CSV: {e}")))?;
    Ok(())
}

/// Write the feature-order manifest.
pub fn write_feature_order(path: &Path) -> Result<(), AppError> {
    write_json(path, &FEATURE_ORDER, "feature order")
}

/// Write any serializable report as pretty JSON.
pub fn write_report_json<T: Serialize + ?Sized>(path: &Path, report: &T) -> Result<(), AppError> {
    write_json(path, report, "report")
}

/// Read a feature-order manifest back.
pub fn read_feature_order(path: &Path) -> Result<Vec<String>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open feature order '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid feature order JSON: {e}")))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T, what: &str) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create {what} JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, value)
        .map_err(|e| AppError::new(2, format!("Failed to write {what} JSON: {e}")))?;
    Ok(())
}
