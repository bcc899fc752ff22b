//! Source file ingest into a `RawTable`.
//!
//! This module only turns a file into named, untyped columns. Whether the
//! columns make sense for a source kind is decided later by the mappers.
//! CSV and Excel workbooks (`.xls`, `.xlsx`, `.xlsm`, `.xlsb`, `.ods`) are
//! supported; the format is picked from the file extension.
//!
//! Design goals:
//! - **Strict structure** for the header (clear errors + exit code 2)
//! - **Row-level tolerance** (skip unreadable records, but report them)
//! - **No typing here**: CSV fields stay text, workbook cells keep the type
//!   the workbook stored

use std::fs::File;
use std::io::Read;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use tracing::{debug, warn};

use crate::domain::{Cell, RawTable};
use crate::error::AppError;

/// Reader options for source exports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestOptions {
    /// Records to skip before the header. `None` uses the format default:
    /// 0 for CSV, 1 for Excel, where the UCI Taiwan workbook carries a banner
    /// row (`X1, X2, ...`) above the real header.
    pub header_row: Option<usize>,
}

/// File formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Excel,
}

impl InputFormat {
    /// Pick the format from the extension (case-insensitive). Anything that
    /// is not a workbook extension is read as CSV.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("xls" | "xlsx" | "xlsm" | "xlsb" | "ods") => InputFormat::Excel,
            _ => InputFormat::Csv,
        }
    }

    pub fn default_header_row(self) -> usize {
        match self {
            InputFormat::Csv => 0,
            InputFormat::Excel => 1,
        }
    }
}

/// A record that could not be read.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct IngestedTable {
    pub table: RawTable,
    pub rows_read: usize,
    pub row_errors: Vec<RowError>,
}

/// Load a CSV file or the first sheet of a workbook.
pub fn load_raw_table(path: &Path, options: &IngestOptions) -> Result<IngestedTable, AppError> {
    let format = InputFormat::from_path(path);
    let header_row = options.header_row.unwrap_or(format.default_header_row());

    let ingested = match format {
        InputFormat::Csv => {
            let file = File::open(path)
                .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
            read_raw_table(file, header_row)
                .map_err(|e| AppError::new(2, format!("Failed to read CSV '{}': {e}", path.display())))?
        }
        InputFormat::Excel => read_excel_table(path, header_row)
            .map_err(|e| AppError::new(2, format!("Failed to read workbook '{}': {e}", path.display())))?,
    };

    debug!(
        path = %path.display(),
        ?format,
        header_row,
        rows = ingested.rows_read,
        columns = ingested.table.n_columns(),
        "loaded raw table"
    );
    if !ingested.row_errors.is_empty() {
        warn!(
            path = %path.display(),
            skipped = ingested.row_errors.len(),
            "skipped unreadable CSV records"
        );
    }
    Ok(ingested)
}

/// Read CSV from any reader, taking the header from record `header_row`.
/// Errors are plain messages so callers can add their own context.
pub fn read_raw_table<R: Read>(reader: R, header_row: usize) -> Result<IngestedTable, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = reader.records().enumerate();

    // Skip banner records, then take the header.
    let mut headers = None;
    for (idx, result) in records.by_ref() {
        let record = result.map_err(|e| format!("CSV parse error on line {}: {e}", idx + 1))?;
        if idx == header_row {
            headers = Some(record.iter().map(str::to_string).collect::<Vec<_>>());
            break;
        }
    }
    let headers = headers.ok_or_else(|| format!("No header found (header_row = {header_row})."))?;
    check_header(&headers)?;

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in records {
        // `idx` is 0-based over all records; CSV lines are 1-based.
        let line = idx + 1;
        rows_read += 1;

        match result {
            Ok(record) => rows.push(record.iter().map(parse_field).collect()),
            Err(e) => row_errors.push(RowError {
                line,
                message: format!("CSV parse error: {e}"),
            }),
        }
    }

    Ok(IngestedTable {
        table: RawTable::from_rows(headers, rows),
        rows_read,
        row_errors,
    })
}

/// Read the first sheet of a workbook, taking the header from sheet row
/// `header_row`.
pub fn read_excel_table(path: &Path, header_row: usize) -> Result<IngestedTable, String> {
    let mut workbook = open_workbook_auto(path).map_err(|e| e.to_string())?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| "Workbook has no sheets.".to_string())?
        .map_err(|e| e.to_string())?;

    // The range starts at the first used row, not necessarily row 0.
    let first_row = range.start().map_or(0, |(row, _)| row as usize);
    let rows = range
        .rows()
        .map(|row| row.iter().map(excel_cell).collect())
        .collect();

    table_from_rows(rows, header_row.saturating_sub(first_row))
}

/// Build a table from already-typed rows, taking the header from row
/// `header_row` and everything below it as data.
pub fn table_from_rows(rows: Vec<Vec<Cell>>, header_row: usize) -> Result<IngestedTable, String> {
    let mut rows = rows.into_iter().skip(header_row);
    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| format!("No header found (header_row = {header_row})."))?
        .iter()
        .map(header_name)
        .collect();
    check_header(&headers)?;

    let rows: Vec<Vec<Cell>> = rows.collect();
    Ok(IngestedTable {
        rows_read: rows.len(),
        table: RawTable::from_rows(headers, rows),
        row_errors: Vec::new(),
    })
}

/// Workbook cell to `Cell`. Dates become `YYYY-MM-DD HH:MM:SS` text so the
/// mappers parse them like CSV dates; error cells read as missing.
pub fn excel_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Null,
        Data::Int(v) => Cell::Number(*v as f64),
        Data::Float(v) => Cell::Number(*v),
        Data::Bool(b) => Cell::Number(if *b { 1.0 } else { 0.0 }),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => parse_field(s.trim()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(dt) => Cell::Text(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => Cell::Number(dt.as_f64()),
        },
    }
}

fn header_name(cell: &Cell) -> String {
    match cell {
        Cell::Null => String::new(),
        other => other.as_text().trim().to_string(),
    }
}

fn check_header(headers: &[String]) -> Result<(), String> {
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err("Header row is empty.".to_string());
    }
    Ok(())
}

fn parse_field(s: &str) -> Cell {
    if s.is_empty() { Cell::Null } else { Cell::Text(s.to_string()) }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use rust_xlsxwriter::Workbook;

    use super::*;
    use crate::domain::SourceKind;
    use crate::normalize::{NormalizeOptions, normalize};

    #[test]
    fn reads_header_and_typed_cells() {
        let csv = "\u{feff}AGE,LIMIT_BAL,default\n25,1000,1\n,2000,0\n";
        let out = read_raw_table(csv.as_bytes(), 0).unwrap();
        assert_eq!(out.rows_read, 2);
        assert_eq!(out.table.n_rows(), 2);
        assert!(out.table.find("AGE").is_some(), "BOM is ignored on lookup");

        let age = out.table.find("AGE").unwrap();
        assert_eq!(age.get(0), &Cell::Text("25".to_string()));
        assert_eq!(age.get(1), &Cell::Null);
    }

    #[test]
    fn honours_header_row() {
        let csv = "X1,X2,Y\nLIMIT_BAL,AGE,default payment next month\n1000,30,1\n";
        let out = read_raw_table(csv.as_bytes(), 1).unwrap();
        assert_eq!(out.table.column_names(), vec!["LIMIT_BAL", "AGE", "default payment next month"]);
        assert_eq!(out.table.n_rows(), 1);
    }

    #[test]
    fn ragged_rows_are_padded() {
        let csv = "a,b,c\n1,2\n1,2,3,4\n";
        let out = read_raw_table(csv.as_bytes(), 0).unwrap();
        assert_eq!(out.table.n_rows(), 2);
        assert_eq!(out.table.find("c").unwrap().get(0), &Cell::Null);
        assert_eq!(out.table.find("c").unwrap().get(1), &Cell::Text("3".to_string()));
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(read_raw_table("".as_bytes(), 0).is_err());
        assert!(read_raw_table("a,b\n".as_bytes(), 3).is_err());
        assert!(table_from_rows(Vec::new(), 0).is_err());
        assert!(table_from_rows(vec![vec![Cell::Null, Cell::Null]], 0).is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = load_raw_table(Path::new("/definitely/not/here.csv"), &IngestOptions::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        let err = load_raw_table(Path::new("/definitely/not/here.xlsx"), &IngestOptions::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.csv");
        std::fs::write(&path, "age,income\n30,100\n").unwrap();
        let out = load_raw_table(&path, &IngestOptions::default()).unwrap();
        assert_eq!(out.table.n_columns(), 2);
        assert_eq!(out.rows_read, 1);
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(InputFormat::from_path(Path::new("data/taiwan.XLS")), InputFormat::Excel);
        assert_eq!(InputFormat::from_path(Path::new("taiwan.xlsx")), InputFormat::Excel);
        assert_eq!(InputFormat::from_path(Path::new("accepted.csv")), InputFormat::Csv);
        assert_eq!(InputFormat::from_path(Path::new("no_extension")), InputFormat::Csv);
        assert_eq!(InputFormat::Excel.default_header_row(), 1);
        assert_eq!(InputFormat::Csv.default_header_row(), 0);
    }

    #[test]
    fn workbook_cells_keep_their_types() {
        assert_eq!(excel_cell(&Data::Int(7)), Cell::Number(7.0));
        assert_eq!(excel_cell(&Data::Float(1.5)), Cell::Number(1.5));
        assert_eq!(excel_cell(&Data::Bool(true)), Cell::Number(1.0));
        assert_eq!(excel_cell(&Data::String(" Fully Paid ".to_string())), Cell::Text("Fully Paid".to_string()));
        assert_eq!(excel_cell(&Data::String(String::new())), Cell::Null);
        assert_eq!(excel_cell(&Data::Empty), Cell::Null);
    }

    fn write_taiwan_workbook(dir: &Path) -> PathBuf {
        let path = dir.join("default of credit card clients.xlsx");
        let mut workbook = Workbook::new();
        {
            let sheet = workbook.add_worksheet();
            for (col, banner) in ["X1", "X2", "X3", "Y"].iter().enumerate() {
                sheet.write_string(0, col as u16, *banner).unwrap();
            }
            for (col, name) in ["LIMIT_BAL", "AGE", "BILL_AMT1", "default payment next month"].iter().enumerate() {
                sheet.write_string(1, col as u16, *name).unwrap();
            }
            let data = [[20000.0, 24.0, 3913.0, 1.0], [120000.0, 26.0, 2682.0, 0.0]];
            for (i, row) in data.iter().enumerate() {
                for (col, v) in row.iter().enumerate() {
                    sheet.write_number(2 + i as u32, col as u16, *v).unwrap();
                }
            }
        }
        workbook.save(&path).unwrap();
        path
    }

    #[test]
    fn workbook_skips_banner_row_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_taiwan_workbook(dir.path());

        let out = load_raw_table(&path, &IngestOptions::default()).unwrap();
        assert_eq!(
            out.table.column_names(),
            vec!["LIMIT_BAL", "AGE", "BILL_AMT1", "default payment next month"]
        );
        assert_eq!(out.rows_read, 2);
        assert_eq!(out.table.find("AGE").unwrap().get(1), &Cell::Number(26.0));

        let normalized = normalize(&out.table, SourceKind::Taiwan, &NormalizeOptions::default()).unwrap();
        assert_eq!(normalized.table.len(), 2);
        assert_eq!(normalized.table.rows()[0].liabilities, 3913.0);
        assert_eq!(normalized.table.targets(), vec![1, 0]);
    }

    #[test]
    fn workbook_header_row_can_be_overridden() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_taiwan_workbook(dir.path());

        let out = load_raw_table(&path, &IngestOptions { header_row: Some(0) }).unwrap();
        assert_eq!(out.table.column_names(), vec!["X1", "X2", "X3", "Y"]);
        assert_eq!(out.rows_read, 3);
    }
}
