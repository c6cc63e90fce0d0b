//! Workbook loading
//!
//! Spreadsheet files are read with calamine: the first row of the sheet's
//! used range is the header, every later row is data. Any other file is read
//! as a JSON [`Workbook`].

use std::{ffi::OsStr, path::Path};

use anyhow::Context;
use calamine::{Data, Reader as _};
use trialstat_analysis::{
    error::ConfigurationError,
    table::{Cell, DataTable, Workbook},
};

use crate::util;

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| {
            SPREADSHEET_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// Loads sheet `sheet` of the workbook at `path`.
pub fn load_sheet(path: &Path, sheet: &str) -> anyhow::Result<DataTable> {
    let table = if is_spreadsheet(path) {
        read_spreadsheet_sheet(path, sheet)?
    } else {
        let workbook: Workbook = util::read_json_file("workbook", path)?;
        workbook.into_sheet(sheet)?
    };
    Ok(table)
}

fn read_spreadsheet_sheet(path: &Path, sheet: &str) -> anyhow::Result<DataTable> {
    let mut workbook = calamine::open_workbook_auto(path)
        .with_context(|| format!("Failed to open spreadsheet file: {}", path.display()))?;

    let available = workbook.sheet_names();
    if !available.iter().any(|name| name == sheet) {
        return Err(ConfigurationError::UnknownSheet {
            sheet: sheet.to_owned(),
            available,
        }
        .into());
    }

    let range = workbook
        .worksheet_range(sheet)
        .with_context(|| format!("Failed to read sheet '{sheet}': {}", path.display()))?;
    let mut rows = range.rows();
    let columns: Vec<String> = rows
        .next()
        .map(|header| {
            header
                .iter()
                .enumerate()
                .map(|(index, data)| column_name(index, data))
                .collect()
        })
        .unwrap_or_default();
    let rows = rows.map(|row| row.iter().map(cell).collect()).collect();

    Ok(DataTable::new(columns, rows)?)
}

fn column_name(index: usize, data: &Data) -> String {
    match data {
        Data::String(name) if !name.trim().is_empty() => name.trim().to_owned(),
        Data::String(_) | Data::Empty => format!("Unnamed: {index}"),
        other => other.to_string(),
    }
}

#[expect(clippy::cast_precision_loss)]
fn cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Missing,
        Data::Float(value) => Cell::number(*value),
        Data::Int(value) => Cell::number(*value as f64),
        Data::String(value) => Cell::text(value),
        other => Cell::text(&other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use trialstat_analysis::{dataset::TrialDataset, treatment::TreatmentAliases};

    use super::*;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("fixtures")
            .join(name)
    }

    #[test]
    fn test_is_spreadsheet() {
        assert!(is_spreadsheet(Path::new("trial.xlsx")));
        assert!(is_spreadsheet(Path::new("data/TRIAL.ODS")));
        assert!(is_spreadsheet(Path::new("trial.xls")));
        assert!(!is_spreadsheet(Path::new("trial.json")));
        assert!(!is_spreadsheet(Path::new("trial")));
    }

    #[test]
    fn test_read_xlsx_sheet() {
        let table = load_sheet(&fixture("trial.xlsx"), "Trial").unwrap();
        assert_eq!(table.columns(), ["mulch_rate", "yield", "height", "remark"]);
        assert_eq!(table.rows().len(), 4);

        let rows = table.rows();
        assert_eq!(
            rows[0],
            [
                Cell::Number(0.0),
                Cell::Number(2.1),
                Cell::Number(30.0),
                Cell::Missing
            ]
        );
        // "NA" string and a text remark
        assert_eq!(rows[1][2], Cell::Missing);
        assert_eq!(rows[1][3], Cell::Text("ok".to_owned()));
        assert_eq!(rows[3][0], Cell::Number(20.0));

        let aliases = TreatmentAliases::new(["mulch_rate"]);
        let dataset = TrialDataset::from_table(table, &aliases).unwrap();
        let responses = dataset
            .responses()
            .iter()
            .map(|variable| variable.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(responses, ["yield", "height"]);
    }

    #[test]
    fn test_unknown_xlsx_sheet() {
        let err = load_sheet(&fixture("trial.xlsx"), "2024").unwrap_err();
        let err = err.downcast::<ConfigurationError>().unwrap();
        assert_eq!(
            err,
            ConfigurationError::UnknownSheet {
                sheet: "2024".to_owned(),
                available: vec!["Trial".to_owned(), "Notes".to_owned()],
            }
        );
    }

    #[test]
    fn test_json_workbook_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trial.json");
        std::fs::write(
            &path,
            r#"{"sheets": {"2024": {"columns": ["trt", "yield"], "rows": [[0, 3.1], [5, "NA"]]}}}"#,
        )
        .unwrap();

        let table = load_sheet(&path, "2024").unwrap();
        assert_eq!(table.columns(), ["trt", "yield"]);
        assert_eq!(table.rows()[1], [Cell::Number(5.0), Cell::Missing]);

        let err = load_sheet(&path, "2025").unwrap_err();
        assert!(err.downcast_ref::<ConfigurationError>().is_some());
    }

    #[test]
    fn test_corrupt_spreadsheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trial.xlsx");
        std::fs::write(&path, "not a zip archive").unwrap();
        let err = load_sheet(&path, "Trial").unwrap_err();
        assert!(err.to_string().starts_with("Failed to open spreadsheet file"));
    }

    #[test]
    fn test_column_name() {
        assert_eq!(column_name(0, &Data::String(" yield ".to_owned())), "yield");
        assert_eq!(column_name(2, &Data::Empty), "Unnamed: 2");
        assert_eq!(column_name(1, &Data::Float(2024.0)), "2024");
        assert_eq!(column_name(3, &Data::Int(7)), "7");
    }

    #[test]
    fn test_cell() {
        assert_eq!(cell(&Data::Int(20)), Cell::Number(20.0));
        assert_eq!(cell(&Data::Float(f64::NAN)), Cell::Missing);
        assert_eq!(cell(&Data::String("#N/A".to_owned())), Cell::Missing);
        assert_eq!(cell(&Data::Bool(true)), Cell::Text("true".to_owned()));
        assert_eq!(cell(&Data::Empty), Cell::Missing);
    }
}
