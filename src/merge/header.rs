//! Header discovery and per-file label normalization.

use crate::spreadsheet::CellGrid;
use std::collections::HashMap;
use std::ops::RangeInclusive;

/// Location and labels of a file's header row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderSpec {
    /// Row just above the header, i.e. the 0-based index of the header row
    pub row: usize,
    /// Column just left of the anchor, i.e. the 0-based index of the anchor column
    pub col: usize,
    /// Contiguous non-empty labels starting at the anchor
    pub labels: Vec<String>,
}

impl HeaderSpec {
    /// True when no anchor was found.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// 1-based grid rows below the header.
    pub fn body_rows(&self, grid: &(impl CellGrid + ?Sized)) -> RangeInclusive<usize> {
        (self.row + 2)..=grid.max_row()
    }

    /// 1-based grid column holding the label at `index`.
    pub fn grid_col(&self, index: usize) -> usize {
        self.col + 1 + index
    }
}

/// Scans the grid row by row for the first cell starting with `marker`, then
/// reads labels rightward from it until the first empty cell. An empty
/// [`HeaderSpec`] means the grid has no header.
pub fn locate_header(grid: &(impl CellGrid + ?Sized), marker: &str) -> HeaderSpec {
    for row in 1..=grid.max_row() {
        for col in 1..=grid.max_col() {
            if grid.get(row, col).is_some_and(|value| value.starts_with(marker)) {
                let labels = (col..=grid.max_col())
                    .map_while(|col| grid.get(row, col))
                    .map(str::to_owned)
                    .collect();
                return HeaderSpec {
                    row: row - 1,
                    col: col - 1,
                    labels,
                };
            }
        }
    }
    HeaderSpec::default()
}

/// Header labels made unique within one file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NormalizedHeader {
    /// One unique name per header column, in column order
    pub names: Vec<String>,
    /// Indexes into `names` of the section marker columns, left to right
    pub markers: Vec<usize>,
}

impl NormalizedHeader {
    /// Number of columns.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True for a header without columns.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Column index of a normalized name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|candidate| candidate == name)
    }
}

/// Suffixes repeated labels: the k-th occurrence (k ≥ 2) of `L` becomes `L-k`.
/// Comparison is byte-exact.
pub fn suffix_duplicates(labels: &[String]) -> Vec<String> {
    let mut seen = HashMap::<&str, usize>::new();
    labels
        .iter()
        .map(|label| {
            let count = seen.entry(label.as_str()).or_insert(0);
            *count += 1;
            if *count == 1 {
                label.to_owned()
            } else {
                format!("{label}-{count}")
            }
        })
        .collect()
}

/// Renames the i-th label starting with `marker` to `marker-i`, overriding
/// any duplicate suffix. Returns the renamed labels and the marker positions.
pub fn renumber_markers(labels: Vec<String>, raw: &[String], marker: &str) -> (Vec<String>, Vec<usize>) {
    let mut markers = Vec::new();
    let names = labels
        .into_iter()
        .zip(raw)
        .enumerate()
        .map(|(index, (label, original))| {
            if original.starts_with(marker) {
                markers.push(index);
                format!("{marker}-{}", markers.len())
            } else {
                label
            }
        })
        .collect();
    (names, markers)
}

/// Applies duplicate suffixing, then section marker renumbering.
pub fn normalize_header(labels: &[String], marker: &str) -> NormalizedHeader {
    let suffixed = suffix_duplicates(labels);
    let (names, markers) = renumber_markers(suffixed, labels, marker);
    NormalizedHeader { names, markers }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::sheet::Sheet;

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn grid(rows: &[&[&str]]) -> Sheet {
        Sheet::from_rows("grid", rows.iter().map(|row| {
            row.iter().map(|value| Some(value.to_string())).collect::<Vec<_>>()
        }))
    }

    #[test]
    fn locates_offset_header() {
        let sheet = grid(&[
            &["Журнал замечаний", "", "", ""],
            &["", "", "", ""],
            &["", "№ п/п", "Запрос от", "Дата", "", "Хвост"],
            &["", "1", "Иванов", "01.01.2024"],
        ]);
        let header = locate_header(&sheet, "№");

        assert_eq!(header.row, 2);
        assert_eq!(header.col, 1);
        assert_eq!(header.labels, labels(&["№ п/п", "Запрос от", "Дата"]));
        assert_eq!(header.body_rows(&sheet), 4..=4);
        assert_eq!(header.grid_col(2), 4);
    }

    #[test]
    fn first_anchor_in_row_major_order_wins() {
        let sheet = grid(&[
            &["", "", "№ документа"],
            &["№", "x"],
        ]);
        let header = locate_header(&sheet, "№");

        assert_eq!(header.row, 0);
        assert_eq!(header.col, 2);
        assert_eq!(header.labels, labels(&["№ документа"]));
    }

    #[test]
    fn missing_anchor_yields_empty_header() {
        let sheet = grid(&[&["Запрос от", "Дата"], &["1", "2"]]);
        let header = locate_header(&sheet, "№");

        assert!(header.is_empty());
        assert_eq!(header, HeaderSpec::default());
    }

    #[test]
    fn suffixes_repeated_labels() {
        let names = suffix_duplicates(&labels(&["A", "B", "A", "A", "B "]));
        assert_eq!(names, labels(&["A", "B", "A-2", "A-3", "B "]));
    }

    #[test]
    fn renumbers_section_markers() {
        let header = normalize_header(
            &labels(&["№", "Комментарий", "Дата", "Комментарий", "Ответ", "Дата", "Дата ответа"]),
            "Дата",
        );

        assert_eq!(header.names, labels(&["№", "Комментарий", "Дата-1", "Комментарий-2", "Ответ", "Дата-2", "Дата-3"]));
        assert_eq!(header.markers, vec![2, 5, 6]);
        assert_eq!(header.position("Комментарий-2"), Some(3));
        assert_eq!(header.len(), 7);
    }

    #[test]
    fn header_without_markers() {
        let header = normalize_header(&labels(&["№", "Запрос от"]), "Дата");
        assert!(header.markers.is_empty());
        assert_eq!(header.names, labels(&["№", "Запрос от"]));
    }
}
