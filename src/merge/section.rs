//! Segmentation of a normalized header into iteration sections, and the
//! row-aligned view of the body the reconciler reads from.

use crate::merge::header::HeaderSpec;
use crate::merge::header::NormalizedHeader;
use crate::spreadsheet::CellGrid;
use std::ops::RangeInclusive;

/// One iteration section: an inclusive span of normalized header columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section {
    /// 1-based section number
    pub number: usize,
    /// First column index
    pub start: usize,
    /// Last column index, the section marker column unless this is the trailing section
    pub end: usize,
}

impl Section {
    /// Column indexes covered by the section.
    pub fn columns(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }
}

/// Splits the header into sections, each ending at a section marker column.
/// Columns after the last marker form a trailing section; a header without
/// markers is a single section.
pub fn segment(header: &NormalizedHeader) -> Vec<Section> {
    let mut sections = Vec::with_capacity(header.markers.len() + 1);
    let mut start = 0usize;
    for &marker in &header.markers {
        sections.push(Section {
            number: sections.len() + 1,
            start,
            end: marker,
        });
        start = marker + 1;
    }
    if start < header.len() {
        sections.push(Section {
            number: sections.len() + 1,
            start,
            end: header.len() - 1,
        });
    }
    sections
}

/// The body of one file seen through its header: cells addressed by body
/// row and normalized column index.
///
/// Each section is trimmed after its last non-empty row. Trimming never
/// moves rows, so a row index means the same record in every section.
pub struct SectionedBody<'a, G: CellGrid + ?Sized> {
    grid: &'a G,
    spec: &'a HeaderSpec,
    header: &'a NormalizedHeader,
    sections: Vec<Section>,
    /// Last grid row holding data, per section
    extents: Vec<Option<usize>>,
    /// Section index per column
    owners: Vec<usize>,
}

impl<'a, G: CellGrid + ?Sized> SectionedBody<'a, G> {
    /// Segments the header and measures every section against the grid.
    pub fn new(grid: &'a G, spec: &'a HeaderSpec, header: &'a NormalizedHeader) -> Self {
        let sections = segment(header);
        let mut owners = vec![0usize; header.len()];
        let extents = sections
            .iter()
            .enumerate()
            .map(|(index, section)| {
                for col in section.columns() {
                    owners[col] = index;
                }
                spec.body_rows(grid).rev().find(|&row| {
                    section.columns().any(|col| grid.get(row, spec.grid_col(col)).is_some())
                })
            })
            .collect();
        Self {
            grid,
            spec,
            header,
            sections,
            extents,
            owners,
        }
    }

    /// Sections in left-to-right order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Normalized header the body is read through.
    pub fn header(&self) -> &NormalizedHeader {
        self.header
    }

    /// Grid rows below the header.
    pub fn rows(&self) -> RangeInclusive<usize> {
        self.spec.body_rows(self.grid)
    }

    /// Last grid row with data in the section at `index`.
    pub fn extent(&self, index: usize) -> Option<usize> {
        self.extents.get(index).copied().flatten()
    }

    /// Cell at grid `row` under normalized column `col`, `None` when empty or
    /// past the owning section's extent.
    pub fn cell(&self, row: usize, col: usize) -> Option<&'a str> {
        let owner = *self.owners.get(col)?;
        if self.extent(owner).is_some_and(|extent| row <= extent) {
            self.grid.get(row, self.spec.grid_col(col))
        } else {
            None
        }
    }

    /// Cell under the column named `name`.
    pub fn named(&self, row: usize, name: &str) -> Option<&'a str> {
        self.cell(row, self.header.position(name)?)
    }

    /// The first section's leading cell, the record identifier.
    pub fn identifier(&self, row: usize) -> Option<&'a str> {
        self.sections.first().and_then(|section| self.cell(row, section.start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::header::locate_header;
    use crate::merge::header::normalize_header;
    use crate::spreadsheet::sheet::Sheet;

    fn header(names: &[&str]) -> NormalizedHeader {
        let labels: Vec<String> = names.iter().map(|name| name.to_string()).collect();
        normalize_header(&labels, "Дата")
    }

    fn grid(rows: &[&[&str]]) -> Sheet {
        Sheet::from_rows("grid", rows.iter().map(|row| {
            row.iter().map(|value| Some(value.to_string())).collect::<Vec<_>>()
        }))
    }

    #[test]
    fn sections_end_at_markers() {
        let sections = segment(&header(&["№", "Комментарий", "Дата", "Ответ", "Дата", "Статус"]));

        assert_eq!(sections, vec![
            Section { number: 1, start: 0, end: 2 },
            Section { number: 2, start: 3, end: 4 },
            Section { number: 3, start: 5, end: 5 },
        ]);
    }

    #[test]
    fn no_trailing_section_after_final_marker() {
        let sections = segment(&header(&["№", "Дата", "Комментарий", "Дата"]));

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].columns(), 2..=3);
    }

    #[test]
    fn header_without_markers_is_one_section() {
        let sections = segment(&header(&["№", "Комментарий"]));
        assert_eq!(sections, vec![Section { number: 1, start: 0, end: 1 }]);
    }

    #[test]
    fn sections_trim_independently_without_shifting_rows() {
        let sheet = grid(&[
            &["№", "Дата", "Комментарий", "Дата"],
            &["1", "01.01.2024", "a", "02.01.2024"],
            &["2", "03.01.2024"],
            &["x"],
        ]);
        let spec = locate_header(&sheet, "№");
        let normalized = normalize_header(&spec.labels, "Дата");
        let body = SectionedBody::new(&sheet, &spec, &normalized);

        assert_eq!(body.rows(), 2..=4);
        assert_eq!(body.extent(0), Some(4));
        assert_eq!(body.extent(1), Some(2));
        assert_eq!(body.identifier(3), Some("2"));
        assert_eq!(body.named(2, "Комментарий"), Some("a"));
        assert_eq!(body.named(3, "Дата-1"), Some("03.01.2024"));
        assert_eq!(body.named(3, "Дата-2"), None);
        assert_eq!(body.named(2, "Нет такой"), None);
        assert_eq!(body.cell(2, 99), None);
    }
}
