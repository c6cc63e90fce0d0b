//! Tabular trial data
//!
//! A [`Workbook`] is a set of named sheets, each a [`DataTable`] with a header
//! row and rows of [`Cell`]s. The JSON form of a workbook:
//!
//! ```json
//! {
//!   "sheets": {
//!     "2024": {
//!       "columns": ["trt", "yield", "height"],
//!       "rows": [
//!         [0, 3.1, 52.0],
//!         [0, 2.9, null],
//!         [5, "NA", 57.5]
//!       ]
//!     }
//!   }
//! }
//! ```
//!
//! Cells are numbers, strings or `null`. Blank strings and the usual
//! spreadsheet NA markers read as [`Cell::Missing`], as do non-finite numbers.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::ConfigurationError;

/// Strings that spreadsheet exports use for a missing value.
const NA_MARKERS: &[&str] = &["NA", "N/A", "#N/A", "NaN", "nan", "null", "NULL", "-nan"];

/// A single table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Missing,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Builds a cell from text, applying the missing-value markers.
    #[must_use]
    pub fn text(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || NA_MARKERS.contains(&trimmed) {
            Self::Missing
        } else {
            Self::Text(trimmed.to_owned())
        }
    }

    /// Builds a cell from a number; non-finite values are missing.
    #[must_use]
    pub fn number(value: f64) -> Self {
        if value.is_finite() {
            Self::Number(value)
        } else {
            Self::Missing
        }
    }

    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Missing | Self::Text(_) => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCell {
    Number(f64),
    Text(String),
}

impl From<Option<RawCell>> for Cell {
    fn from(raw: Option<RawCell>) -> Self {
        match raw {
            None => Self::Missing,
            Some(RawCell::Number(value)) => Self::number(value),
            Some(RawCell::Text(value)) => Self::text(&value),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawTable {
    columns: Vec<String>,
    #[serde(default)]
    rows: Vec<Vec<Option<RawCell>>>,
}

/// One sheet of trial data.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawTable")]
pub struct DataTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl TryFrom<RawTable> for DataTable {
    type Error = ConfigurationError;

    fn try_from(raw: RawTable) -> Result<Self, Self::Error> {
        let rows = raw
            .rows
            .into_iter()
            .map(|row| row.into_iter().map(Cell::from).collect())
            .collect();
        Self::new(raw.columns, rows)
    }
}

impl DataTable {
    /// Creates a table, padding short rows with [`Cell::Missing`].
    ///
    /// Rows with more cells than there are columns are rejected.
    pub fn new(columns: Vec<String>, mut rows: Vec<Vec<Cell>>) -> Result<Self, ConfigurationError> {
        for (row, cells) in rows.iter_mut().enumerate() {
            if cells.len() > columns.len() {
                return Err(ConfigurationError::RaggedRow {
                    row,
                    len: cells.len(),
                    expected: columns.len(),
                });
            }
            cells.resize(columns.len(), Cell::Missing);
        }
        Ok(Self { columns, rows })
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Index of the column with exactly this name.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, index: usize) -> impl Iterator<Item = &Cell> {
        self.rows.iter().map(move |row| &row[index])
    }

    /// Whether every non-missing cell of the column is a number.
    ///
    /// A column with no values at all counts as numeric.
    #[must_use]
    pub fn is_numeric_column(&self, index: usize) -> bool {
        self.column(index)
            .all(|cell| matches!(cell, Cell::Missing | Cell::Number(_)))
    }
}

/// A named collection of sheets.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Workbook {
    sheets: BTreeMap<String, DataTable>,
}

impl Workbook {
    #[must_use]
    pub fn new(sheets: BTreeMap<String, DataTable>) -> Self {
        Self { sheets }
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.keys().map(String::as_str)
    }

    pub fn sheet(&self, name: &str) -> Result<&DataTable, ConfigurationError> {
        self.sheets.get(name).ok_or_else(|| self.unknown_sheet(name))
    }

    /// Consumes the workbook, keeping only the named sheet.
    pub fn into_sheet(mut self, name: &str) -> Result<DataTable, ConfigurationError> {
        let error = self.unknown_sheet(name);
        self.sheets.remove(name).ok_or(error)
    }

    fn unknown_sheet(&self, name: &str) -> ConfigurationError {
        ConfigurationError::UnknownSheet {
            sheet: name.to_owned(),
            available: self.sheet_names().map(str::to_owned).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_workbook() {
        let json = r#"{
            "sheets": {
                "trial": {
                    "columns": ["trt", "yield"],
                    "rows": [[1, 2.5], ["B", null], [2, "NA"], [3]]
                }
            }
        }"#;
        let workbook: Workbook = serde_json::from_str(json).unwrap();
        let table = workbook.sheet("trial").unwrap();

        assert_eq!(table.columns(), ["trt", "yield"]);
        assert_eq!(table.rows().len(), 4);
        assert_eq!(table.rows()[0], vec![Cell::Number(1.0), Cell::Number(2.5)]);
        assert_eq!(
            table.rows()[1],
            vec![Cell::Text("B".to_owned()), Cell::Missing]
        );
        assert_eq!(table.rows()[2][1], Cell::Missing);
        // Short rows are padded
        assert_eq!(table.rows()[3], vec![Cell::Number(3.0), Cell::Missing]);
    }

    #[test]
    fn test_ragged_row_is_rejected() {
        let json = r#"{"sheets": {"s": {"columns": ["a"], "rows": [[1, 2]]}}}"#;
        let err = serde_json::from_str::<Workbook>(json).unwrap_err();
        assert!(err.to_string().contains("Row 0 has 2 cells"));
    }

    #[test]
    fn test_unknown_sheet() {
        let workbook = Workbook::new(BTreeMap::from([(
            "a".to_owned(),
            DataTable::new(vec!["x".to_owned()], vec![]).unwrap(),
        )]));
        let err = workbook.into_sheet("b").unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownSheet {
                sheet: "b".to_owned(),
                available: vec!["a".to_owned()],
            }
        );
    }

    #[test]
    fn test_missing_markers() {
        assert_eq!(Cell::text("  "), Cell::Missing);
        assert_eq!(Cell::text("N/A"), Cell::Missing);
        assert_eq!(Cell::text(" control "), Cell::Text("control".to_owned()));
        assert_eq!(Cell::number(f64::NAN), Cell::Missing);
    }

    #[test]
    fn test_numeric_column_detection() {
        let table = DataTable::new(
            vec!["trt".to_owned(), "yield".to_owned(), "note".to_owned(), "empty".to_owned()],
            vec![
                vec![Cell::Text("A".to_owned()), Cell::Number(1.0), Cell::Text("ok".to_owned())],
                vec![Cell::Text("B".to_owned()), Cell::Missing, Cell::Number(3.0)],
            ],
        )
        .unwrap();

        assert!(!table.is_numeric_column(0));
        assert!(table.is_numeric_column(1));
        assert!(!table.is_numeric_column(2));
        assert!(table.is_numeric_column(3));
    }
}
