//! # Spreadsheet Module
//!
//! Reading Excel Open XML workbooks (`.xlsx`, `.xlsm`) into sparse cell grids
//! and writing the merged table back out. The merge engine only sees the
//! [`CellGrid`] trait, so any 1-based grid of optional strings can feed it.
use crate::error::RustySheetMergeError;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::xlsx::XlsxSpreadsheet;
use std::path::Path;
use thiserror::Error;

pub(crate) mod cell;
mod excel;
pub(crate) mod reference;
pub mod sheet;
pub mod writer;
pub(crate) mod xlsx;

/// Errors raised while opening or reading spreadsheet files.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Unsupported spreadsheet format '{0}'")]
    FileFormatError(String),

    #[error("Missing package part '{0}'")]
    FileError(String),

    #[error("Spreadsheet '{0}' is encrypted or in legacy binary format")]
    CompoundFileError(String),

    #[error("Spreadsheet '{0}' has no worksheets")]
    SpreadsheetEmptyError(String),

    #[error("Worksheet '{1}' not found in '{0}'")]
    SheetNotFound(String, String),
}

/// A rectangular grid of optional string cells, addressed by 1-based row and column.
pub trait CellGrid {
    /// Last row that may hold a value.
    fn max_row(&self) -> usize;

    /// Last column that may hold a value.
    fn max_col(&self) -> usize;

    /// Cell text at `(row, col)`; `None` when the cell is empty or out of range.
    fn get(&self, row: usize, col: usize) -> Option<&str>;
}

/// A workbook that can hand out its worksheets as grids.
pub trait Spreadsheet {
    /// Reads the worksheet that was active when the file was saved
    fn read_active_sheet(&mut self) -> Result<Sheet, RustySheetMergeError>;
}

/// Opens a spreadsheet, choosing the reader from the file extension.
pub fn open_spreadsheet(path: &Path) -> Result<Box<dyn Spreadsheet>, RustySheetMergeError> {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| extension.to_ascii_lowercase());
    match extension.as_deref() {
        Some("xlsx") | Some("xlsm") => Ok(Box::new(XlsxSpreadsheet::open(path)?)),
        _ => Err(SpreadsheetError::FileFormatError(path.display().to_string()))?,
    }
}

/// Reads the active worksheet of the spreadsheet at `path`.
pub fn read_active_sheet(path: &Path) -> Result<Sheet, RustySheetMergeError> {
    open_spreadsheet(path)?.read_active_sheet()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_extension() {
        let error = open_spreadsheet(Path::new("notes.csv")).err().unwrap();
        assert!(error.to_string().contains("Unsupported spreadsheet format"));
    }

    #[test]
    fn reports_missing_file() {
        assert!(read_active_sheet(Path::new("does-not-exist.xlsx")).is_err());
    }
}
