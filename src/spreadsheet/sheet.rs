use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::CellGrid;
use std::collections::HashMap;

/// A worksheet loaded from a spreadsheet file: the sparse set of non-empty
/// cells plus the bounds they span. Rows and columns are 1-based.
#[derive(Clone, Debug, Default)]
pub struct Sheet {
    /// Source file name
    pub(crate) file_name: String,
    /// Sheet name
    pub(crate) name: String,
    /// Rendered cell text keyed by (row, col)
    texts: HashMap<(usize, usize), String>,
    /// Largest row holding a value
    pub(crate) row_upper_bound: Option<usize>,
    /// Largest column holding a value
    pub(crate) col_upper_bound: Option<usize>,
}

impl Sheet {
    /// Creates an empty sheet.
    pub(crate) fn new(file_name: &str, name: &str) -> Self {
        Self {
            file_name: file_name.to_owned(),
            name: name.to_owned(),
            ..Self::default()
        }
    }

    /// Builds a sheet from in-memory rows, treating `None` and empty strings as
    /// absent cells. Row and column indexes start at 1.
    pub fn from_rows<R, C>(name: &str, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = Option<String>>,
    {
        let mut sheet = Self::new(name, name);
        for (row, values) in rows.into_iter().enumerate() {
            for (col, value) in values.into_iter().enumerate() {
                if let Some(value) = value {
                    sheet.push(Cell {
                        row: row + 1,
                        col: col + 1,
                        kind: CellType::InlineString,
                        value,
                    });
                }
            }
        }
        sheet
    }

    /// Returns true if the sheet contains no cells.
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Path of the workbook the sheet was read from.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Name of the worksheet inside its workbook.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a cell to the sheet, updating its bounds. Empty values are dropped,
    /// a later cell at the same position replaces the earlier one.
    pub(crate) fn push(&mut self, cell: Cell) {
        let text = cell.to_text();
        if text.is_empty() {
            return;
        }
        self.update_bound(cell.row, cell.col);
        self.texts.insert((cell.row, cell.col), text);
    }

    /// Updates the data range boundaries based on cell positions.
    fn update_bound(&mut self, row: usize, col: usize) {
        if self.row_upper_bound.map(|row_upper_bound| row_upper_bound < row).unwrap_or(true) {
            self.row_upper_bound = Some(row);
        }
        if self.col_upper_bound.map(|col_upper_bound| col_upper_bound < col).unwrap_or(true) {
            self.col_upper_bound = Some(col);
        }
    }
}

impl CellGrid for Sheet {
    fn max_row(&self) -> usize {
        self.row_upper_bound.unwrap_or(0)
    }

    fn max_col(&self) -> usize {
        self.col_upper_bound.unwrap_or(0)
    }

    fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.texts.get(&(row, col)).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push(sheet: &mut Sheet, row: usize, col: usize, value: &str) {
        sheet.push(Cell {
            row,
            col,
            kind: CellType::InlineString,
            value: value.to_owned(),
        });
    }

    #[test]
    fn sheet_initial() {
        let sheet = Sheet::new("a.xlsx", "Sheet1");

        assert!(sheet.is_empty());
        assert_eq!(sheet.max_row(), 0);
        assert_eq!(sheet.max_col(), 0);
        assert_eq!(sheet.get(1, 1), None);
    }

    #[test]
    fn sheet_update() {
        let mut sheet = Sheet::new("a.xlsx", "Sheet1");
        push(&mut sheet, 1, 1, "a");
        push(&mut sheet, 1, 3, "b");
        push(&mut sheet, 4, 2, "c");

        assert!(!sheet.is_empty());
        assert_eq!(sheet.max_row(), 4);
        assert_eq!(sheet.max_col(), 3);
        assert_eq!(sheet.get(1, 3), Some("b"));
        assert_eq!(sheet.get(2, 2), None);
        assert_eq!(sheet.get(0, 0), None);
    }

    #[test]
    fn sheet_drops_empty_values() {
        let mut sheet = Sheet::new("a.xlsx", "Sheet1");
        push(&mut sheet, 5, 5, "");

        assert!(sheet.is_empty());
        assert_eq!(sheet.max_row(), 0);
    }

    #[test]
    fn sheet_from_rows() {
        let sheet = Sheet::from_rows("grid", vec![
            vec![None, Some("x".to_owned())],
            vec![Some("y".to_owned()), Some(String::new())],
        ]);

        assert_eq!(sheet.get(1, 2), Some("x"));
        assert_eq!(sheet.get(2, 1), Some("y"));
        assert_eq!(sheet.get(2, 2), None);
        assert_eq!(sheet.max_col(), 2);
    }
}
