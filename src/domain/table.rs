//! In-memory representation of a loaded source file.
//!
//! A `RawTable` is column-major and makes no assumption about the file format
//! it came from. Cells stay untyped until a mapper asks for a coercion.

use std::borrow::Cow;

/// A single heterogeneous value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Numeric view. NaN and unparseable text are missing; infinities are kept
    /// so derivations can detect and drop them.
    pub fn as_f64(&self) -> Option<f64> {
        let v = match self {
            Cell::Null => return None,
            Cell::Number(v) => *v,
            Cell::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return None;
                }
                s.parse::<f64>().ok()?
            }
        };
        if v.is_nan() { None } else { Some(v) }
    }

    /// String view. A missing value reads as `"nan"`.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Cell::Null => Cow::Borrowed("nan"),
            Cell::Number(v) if v.is_nan() => Cow::Borrowed("nan"),
            Cell::Number(v) => Cow::Owned(v.to_string()),
            Cell::Text(s) => Cow::Borrowed(s.as_str()),
        }
    }

    /// Integer view used for labels (truncates toward zero).
    pub fn as_label(&self) -> Option<i64> {
        let v = self.as_f64()?;
        if !v.is_finite() {
            return None;
        }
        Some(v.trunc() as i64)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Cell::Null, Into::into)
    }
}

static NULL_CELL: Cell = Cell::Null;

#[derive(Debug, Clone, PartialEq)]
pub struct RawColumn {
    pub name: String,
    pub values: Vec<Cell>,
}

impl RawColumn {
    pub fn new(name: impl Into<String>, values: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Cell at `row`; short columns read as `Null` past their end.
    pub fn get(&self, row: usize) -> &Cell {
        self.values.get(row).unwrap_or(&NULL_CELL)
    }

    pub fn normalized_name(&self) -> &str {
        normalize_header_name(&self.name)
    }
}

/// Ordered collection of named columns, immutable within a normalization run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    columns: Vec<RawColumn>,
}

impl RawTable {
    pub fn new(columns: Vec<RawColumn>) -> Self {
        Self { columns }
    }

    /// Build from a header plus row-major records. Ragged rows are padded with
    /// `Null` (or truncated) to the header width.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let mut columns: Vec<RawColumn> = headers
            .into_iter()
            .map(|name| RawColumn::new(name, Vec::with_capacity(rows.len())))
            .collect();

        for row in rows {
            let mut cells = row.into_iter();
            for col in columns.iter_mut() {
                col.values.push(cells.next().unwrap_or(Cell::Null));
            }
        }

        Self { columns }
    }

    pub fn columns(&self) -> &[RawColumn] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn n_rows(&self) -> usize {
        self.columns.iter().map(|c| c.values.len()).max().unwrap_or(0)
    }

    /// Look up a column by its exact name, ignoring only surrounding
    /// whitespace and a UTF-8 BOM. Case matters: `AGE` does not satisfy `age`.
    /// The first matching column wins.
    pub fn find(&self, name: &str) -> Option<&RawColumn> {
        let key = normalize_header_name(name);
        self.columns.iter().find(|c| c.normalized_name() == key)
    }

    /// All columns whose name starts with `prefix` (case-sensitive), in table order.
    pub fn columns_with_prefix(&self, prefix: &str) -> Vec<&RawColumn> {
        let prefix = normalize_header_name(prefix);
        self.columns
            .iter()
            .filter(|c| c.normalized_name().starts_with(prefix))
            .collect()
    }

    /// Names from `required` that cannot be found, in the order given.
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|name| self.find(name).is_none())
            .map(|name| name.to_string())
            .collect()
    }
}

/// Normalize a header for lookups.
pub fn normalize_header_name(name: &str) -> &str {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, schema validation will incorrectly
    // report missing columns.
    name.trim_start_matches('\u{feff}').trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_coercion() {
        assert_eq!(Cell::from(" 12.5 ").as_f64(), Some(12.5));
        assert_eq!(Cell::from("").as_f64(), None);
        assert_eq!(Cell::from("abc").as_f64(), None);
        assert_eq!(Cell::from("NaN").as_f64(), None);
        assert_eq!(Cell::Number(f64::NAN).as_f64(), None);
        assert_eq!(Cell::from("inf").as_f64(), Some(f64::INFINITY));
        assert_eq!(Cell::Null.as_f64(), None);
    }

    #[test]
    fn text_coercion() {
        assert_eq!(Cell::Null.as_text(), "nan");
        assert_eq!(Cell::Number(1.0).as_text(), "1");
        assert_eq!(Cell::from("Charged Off").as_text(), "Charged Off");
    }

    #[test]
    fn label_coercion_truncates() {
        assert_eq!(Cell::from("1").as_label(), Some(1));
        assert_eq!(Cell::from("1.0").as_label(), Some(1));
        assert_eq!(Cell::Number(-1.0).as_label(), Some(-1));
        assert_eq!(Cell::Number(0.7).as_label(), Some(0));
        assert_eq!(Cell::from("yes").as_label(), None);
        assert_eq!(Cell::from("inf").as_label(), None);
    }

    #[test]
    fn find_ignores_whitespace_and_bom() {
        let table = RawTable::new(vec![
            RawColumn::new("\u{feff}ID", vec![]),
            RawColumn::new(" AGE ", vec![]),
        ]);
        assert!(table.find("ID").is_some());
        assert!(table.find("AGE").is_some());
        assert!(table.find("LIMIT_BAL").is_none());
        assert_eq!(table.missing_columns(&["AGE", "LIMIT_BAL", "ID"]), vec!["LIMIT_BAL"]);
    }

    #[test]
    fn find_is_case_sensitive() {
        let table = RawTable::new(vec![RawColumn::new("AGE", vec![]), RawColumn::new("Bill_Amt1", vec![])]);
        assert!(table.find("age").is_none());
        assert_eq!(table.missing_columns(&["age"]), vec!["age"]);
        assert!(table.columns_with_prefix("BILL_AMT").is_empty());
    }

    #[test]
    fn from_rows_pads_short_rows() {
        let table = RawTable::from_rows(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![Cell::from(1.0)], vec![Cell::from(2.0), Cell::from(3.0), Cell::from(9.0)]],
        );
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.columns()[1].get(0), &Cell::Null);
        assert_eq!(table.columns()[1].get(1), &Cell::Number(3.0));
    }

    #[test]
    fn prefix_lookup_keeps_table_order() {
        let table = RawTable::new(vec![
            RawColumn::new("BILL_AMT2", vec![]),
            RawColumn::new("AGE", vec![]),
            RawColumn::new("BILL_AMT1", vec![]),
        ]);
        let names: Vec<_> = table.columns_with_prefix("BILL_AMT").iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["BILL_AMT2", "BILL_AMT1"]);
    }
}
