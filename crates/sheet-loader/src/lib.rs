//! Spreadsheet loading into a record [`Table`].
//!
//! The first row of the sheet is the header; every following non-blank row
//! becomes one record.

pub mod cells;

use std::path::{Path, PathBuf};

use calamine::{Data, Reader, open_workbook_auto};
use qr_labels::{CellValue, Table};
use tracing::info;

pub use cells::{cell_value, header_names};

#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    #[error("failed to open workbook {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("workbook has no sheets")]
    NoSheet,

    #[error("sheet {0:?} not found")]
    MissingSheet(String),

    #[error("failed to read sheet {sheet:?}: {source}")]
    Read {
        sheet: String,
        #[source]
        source: calamine::Error,
    },

    #[error("sheet {0:?} has no header row")]
    EmptySheet(String),
}

/// Load `sheet` (or the first sheet) of the workbook at `path`.
pub fn load_table(path: impl AsRef<Path>, sheet: Option<&str>) -> Result<Table, SheetError> {
    let path = path.as_ref();
    let mut workbook = open_workbook_auto(path).map_err(|source| SheetError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let names = workbook.sheet_names();
    let sheet_name = match sheet {
        Some(name) if names.iter().any(|n| n == name) => name.to_string(),
        Some(name) => return Err(SheetError::MissingSheet(name.to_string())),
        None => names.first().cloned().ok_or(SheetError::NoSheet)?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|source| SheetError::Read {
            sheet: sheet_name.clone(),
            source,
        })?;

    let table = table_from_rows(range.rows()).ok_or(SheetError::EmptySheet(sheet_name.clone()))?;
    info!(
        path = %path.display(),
        sheet = %sheet_name,
        rows = table.len(),
        columns = table.columns().len(),
        "Loaded sheet"
    );
    Ok(table)
}

/// Build a table from raw sheet rows, header first.
///
/// Returns `None` when there is no header row.
pub fn table_from_rows<'a>(mut rows: impl Iterator<Item = &'a [Data]>) -> Option<Table> {
    let columns = header_names(rows.next()?);
    let records: Vec<Vec<CellValue>> = rows
        .filter(|row| !cells::is_blank_row(row))
        .map(|row| row.iter().map(cell_value).collect())
        .collect();
    Some(Table::new(columns, records))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Data {
        Data::String(s.to_string())
    }

    #[test]
    fn builds_table_from_rows() {
        let rows = [
            vec![text("Nivel"), text("Veta"), text("Tajo"), text("Ley")],
            vec![text("N1"), text("V2"), text("T-07"), Data::Float(0.5)],
            vec![Data::Empty, Data::Empty, Data::Empty, Data::Empty],
            vec![Data::Float(3900.0), text("V3"), Data::Empty],
        ];

        let table = table_from_rows(rows.iter().map(Vec::as_slice)).unwrap();
        assert_eq!(table.columns(), ["Nivel", "Veta", "Tajo", "Ley"]);
        assert_eq!(table.len(), 2);

        let second = table.get(1).unwrap();
        assert_eq!(second.index(), 1);
        assert_eq!(second.get("Nivel"), Some(&CellValue::Integer(3900)));
        assert_eq!(second.get("Tajo"), Some(&CellValue::Null));
        assert_eq!(second.get("Ley"), Some(&CellValue::Null));
    }

    #[test]
    fn no_rows_means_no_table() {
        assert!(table_from_rows(std::iter::empty()).is_none());
    }

    #[test]
    fn header_only_sheet_is_empty_table() {
        let rows = [vec![text("Nivel"), text("Veta"), text("Tajo")]];
        let table = table_from_rows(rows.iter().map(Vec::as_slice)).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns().len(), 3);
    }

    #[test]
    fn missing_workbook_is_open_error() {
        let err = load_table("does/not/exist.xlsx", None).unwrap_err();
        assert!(matches!(err, SheetError::Open { .. }));
    }
}
