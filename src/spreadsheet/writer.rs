//! Table writer: serializes the merged table into an `.xlsx` workbook.

use crate::error::RustySheetMergeError;
use rust_xlsxwriter::Format;
use rust_xlsxwriter::Workbook;
use std::path::Path;

/// Worksheet name of the merged table
const SHEET_NAME: &str = "Sheet1";

/// Widest column the writer sizes automatically, in characters
const MAX_COLUMN_WIDTH: usize = 60;

/// A single output cell value.
#[derive(Clone, Debug, PartialEq)]
pub enum TableValue {
    /// Text cell
    Text(String),
    /// Numeric cell
    Number(f64),
}

impl TableValue {
    /// Display width used to size the column.
    fn width(&self) -> usize {
        match self {
            TableValue::Text(text) => text.lines().map(|line| line.chars().count()).max().unwrap_or(0),
            TableValue::Number(number) => number.to_string().len(),
        }
    }
}

/// A fully materialized table: header names and row-aligned values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    /// Column names in output order
    pub columns: Vec<String>,
    /// Rows, each as long as `columns`; `None` renders as an empty cell
    pub rows: Vec<Vec<Option<TableValue>>>,
}

/// Writes `table` to `path` as a single-sheet workbook: a bold header row
/// followed by one row per record.
pub fn write_table(path: &Path, table: &Table) -> Result<(), RustySheetMergeError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let wrap_format = Format::new().set_text_wrap();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    let mut widths: Vec<usize> = table.columns.iter().map(|name| name.chars().count()).collect();
    for (col, name) in table.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, name, &header_format)?;
    }
    for (index, values) in table.rows.iter().enumerate() {
        let row = (index + 1) as u32;
        for (col, value) in values.iter().enumerate() {
            let Some(value) = value else { continue };
            if let Some(width) = widths.get_mut(col) {
                *width = (*width).max(value.width());
            }
            match value {
                TableValue::Text(text) if text.contains('\n') => {
                    worksheet.write_string_with_format(row, col as u16, text, &wrap_format)?;
                }
                TableValue::Text(text) => {
                    worksheet.write_string(row, col as u16, text)?;
                }
                TableValue::Number(number) => {
                    worksheet.write_number(row, col as u16, *number)?;
                }
            }
        }
    }
    for (col, width) in widths.into_iter().enumerate() {
        worksheet.set_column_width(col as u16, (width.min(MAX_COLUMN_WIDTH) + 2) as f64)?;
    }
    worksheet.set_freeze_panes(1, 0)?;

    workbook.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::read_active_sheet;
    use crate::spreadsheet::CellGrid;

    #[test]
    fn value_width_uses_longest_line() {
        assert_eq!(TableValue::Text("1) ab\n2) abcdef".into()).width(), 9);
        assert_eq!(TableValue::Number(12.0).width(), 2);
    }

    #[test]
    fn written_table_reads_back() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("out.xlsx");
        let table = Table {
            columns: vec!["Файл".into(), "№".into(), "Количество итераций".into()],
            rows: vec![
                vec![Some(TableValue::Text("A".into())), Some(TableValue::Text("1".into())), Some(TableValue::Number(2.0))],
                vec![Some(TableValue::Text("B".into())), None, Some(TableValue::Text("1) x\n2) y".into()))],
            ],
        };
        write_table(&path, &table).unwrap();

        let sheet = read_active_sheet(&path).unwrap();
        assert_eq!(sheet.get(1, 1), Some("Файл"));
        assert_eq!(sheet.get(2, 2), Some("1"));
        assert_eq!(sheet.get(2, 3), Some("2"));
        assert_eq!(sheet.get(3, 2), None);
        assert_eq!(sheet.get(3, 3), Some("1) x\n2) y"));
        assert_eq!(sheet.max_row(), 3);
    }
}
