use crate::error::RustySheetMergeError;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::excel;
use crate::spreadsheet::excel::load_relationships;
use crate::spreadsheet::excel::FileReader;
use crate::spreadsheet::reference::reference_to_index;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::Spreadsheet;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::collections::HashMap;
use std::io::BufRead;
use std::io::Read;
use std::io::Seek;
use std::path::Path;
use zip::ZipArchive;

// XML tag names for parsing Excel XLSX format
const TAG_CUSTOM_FORMATS: QName = QName(b"numFmts"); // Custom number formats container
const TAG_CUSTOM_FORMAT: QName = QName(b"numFmt");   // Individual custom number format
const TAG_FORMAT_INDEXES: QName = QName(b"cellXfs");  // Cell format indexes container
const TAG_FORMAT_INDEX: QName = QName(b"xf");         // Individual cell format index
const TAG_SHARED_STRING_ITEM: QName = QName(b"si");   // Shared string table item
const TAG_PHONETIC_TEXT: QName = QName(b"rPh");       // Phonetic text for Asian languages
const TAG_TEXT: QName = QName(b"t");                  // Text content within strings
const TAG_WORKBOOK_PROPERTIES: QName = QName(b"workbookPr"); // Workbook properties
const TAG_WORKBOOK_VIEW: QName = QName(b"workbookView"); // Window state, holds the active tab
const TAG_SHEET: QName = QName(b"sheet");             // Worksheet definition
const TAG_ROW: QName = QName(b"row");                 // Row in worksheet
const TAG_CELL: QName = QName(b"c");                  // Cell in worksheet
const TAG_INLINE_STRING: QName = QName(b"is");        // Inline string value
const TAG_VALUE: QName = QName(b"v");                 // Cell value content

/// Workbook structure read from `xl/workbook.xml`
struct Workbook {
    /// Worksheets as (name, zip_path) pairs in tab order
    sheets: Vec<(String, String)>,
    /// Whether dates count from 1904
    is_1904: bool,
    /// Tab that was active when the file was saved
    active_tab: usize,
}

/// Represents an Excel XLSX spreadsheet file
pub(crate) struct XlsxSpreadsheet {
    /// File name of the spreadsheet
    name: String,
    /// ZIP archive containing the XLSX file contents
    zip: ZipArchive<FileReader>,
    /// Parsed number formats for cell type detection, indexed by style id
    number_formats: Vec<CellType>,
    /// List of worksheets with (name, zip_path) pairs
    sheets: Vec<(String, String)>,
    /// Index into `sheets` of the active worksheet
    active_tab: usize,
    /// Shared string table, loaded on first sheet read
    shared_strings: Option<Vec<String>>,
}

impl XlsxSpreadsheet {
    /// Opens an XLSX spreadsheet file and parses its workbook structure and styles
    pub(crate) fn open(path: &Path) -> Result<XlsxSpreadsheet, RustySheetMergeError> {
        let name = path.display().to_string();
        let mut zip = excel::open(path)?;
        let workbook = load_workbook(&mut zip)?;
        if workbook.sheets.is_empty() {
            Err(SpreadsheetError::SpreadsheetEmptyError(name.to_owned()))?
        }
        let number_formats = load_number_formats(&mut zip, workbook.is_1904)?;
        let active_tab = workbook.active_tab.min(workbook.sheets.len() - 1);
        Ok(XlsxSpreadsheet {
            name,
            zip,
            number_formats,
            sheets: workbook.sheets,
            active_tab,
            shared_strings: None,
        })
    }

    /// Reads the worksheet at `index` in tab order
    pub(crate) fn read_sheet(&mut self, index: usize) -> Result<Sheet, RustySheetMergeError> {
        let (sheet_name, zip_path) = self.sheets.get(index).cloned()
            .ok_or_else(|| SpreadsheetError::SheetNotFound(self.name.to_owned(), format!("#{index}")))?;
        if self.shared_strings.is_none() {
            self.shared_strings = Some(load_shared_strings(&mut self.zip)?);
        }
        let shared_strings = self.shared_strings.as_deref().unwrap_or_default();

        let mut sheet = Sheet::new(&self.name, &sheet_name);
        let mut row = 0usize;
        let mut col = 0usize;
        let mut kind = CellType::default();
        let mut value = String::new();
        let mut reader = self.zip.xml_reader(&zip_path)?
            .ok_or_else(|| SpreadsheetError::FileError(zip_path.to_owned()))?;
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TAG_ROW => {
                row = match event.get_attribute_value("r")? {
                    Some(index) => index.parse::<usize>()?,
                    None => row + 1,
                };
                col = 0;
            }
            Event::Start(event) if event.name() == TAG_CELL => {
                (row, col) = event.get_attribute_value("r")?
                    .and_then(|reference| reference_to_index(&reference))
                    .unwrap_or((row, col + 1));
                value.clear();
                kind = event.get_attribute_value("t")?.map(|t| {
                    match t.as_ref() {
                        "inlineStr" | "str" => CellType::InlineString,
                        "s" => CellType::SharedString,
                        "d" => CellType::IsoDateTime,
                        "b" => CellType::Boolean,
                        "e" => CellType::Error,
                        _ => CellType::Number,
                    }
                }).unwrap_or(CellType::Number);
                if let Some(format_id) = event.get_attribute_value("s")? {
                    if kind == CellType::Number && !format_id.is_empty() {
                        let index = format_id.parse::<usize>()?;
                        kind = self.number_formats.get(index).copied().unwrap_or(CellType::Number);
                    }
                }
            }
            Event::Start(event) if kind != CellType::Empty && event.name() == TAG_INLINE_STRING => {
                value = read_string_value(&mut reader, TAG_INLINE_STRING, false)?;
            }
            Event::Start(event) if kind != CellType::Empty && event.name() == TAG_VALUE => {
                value = read_string_value(&mut reader, TAG_VALUE, true)?;
            }
            Event::End(event) if event.name() == TAG_CELL => {
                if kind == CellType::SharedString {
                    let index = value.parse::<usize>()?;
                    value = shared_strings.get(index).cloned().unwrap_or_default();
                    kind = CellType::InlineString;
                }
                if kind != CellType::Empty && !value.is_empty() {
                    sheet.push(Cell {
                        row,
                        col,
                        kind,
                        value: std::mem::take(&mut value),
                    });
                }
                kind = CellType::Empty;
            }
        });
        Ok(sheet)
    }
}

impl Spreadsheet for XlsxSpreadsheet {
    fn read_active_sheet(&mut self) -> Result<Sheet, RustySheetMergeError> {
        self.read_sheet(self.active_tab)
    }
}

/// Loads workbook structure from `xl/workbook.xml`: worksheet names and
/// paths, the date system, and the active tab.
fn load_workbook<RS: Read + Seek>(zip: &mut ZipArchive<RS>) -> Result<Workbook, RustySheetMergeError> {
    let relationships = load_relationships(zip, "xl/_rels/workbook.xml.rels")?;
    let mut reader = zip.xml_reader("xl/workbook.xml")?
        .ok_or_else(|| SpreadsheetError::FileError("xl/workbook.xml".to_string()))?;
    let mut workbook = Workbook {
        sheets: Vec::new(),
        is_1904: false,
        active_tab: 0,
    };
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHEET => {
            let mut name = None::<String>;
            let mut id = None::<String>;
            for result in event.attributes() {
                let attribute = result?;
                let key = attribute.key.local_name();
                if key.as_ref() == b"name" {
                    name = Some(attribute.unescape_value()?.to_string());
                } else if key.as_ref() == b"id" {
                    id = Some(attribute.unescape_value()?.to_string());
                }
            }
            if let Some((name, id)) = name.zip(id) {
                if let Some(path) = relationships.get(&id) {
                    workbook.sheets.push((name, path.to_owned()));
                }
            }
        }
        Event::Start(event) if event.name() == TAG_WORKBOOK_PROPERTIES => {
            workbook.is_1904 = event.get_attribute_value("date1904")?
                .map(|value| value.eq("1") || value.eq("true"))
                .unwrap_or(false);
        }
        Event::Start(event) if event.name() == TAG_WORKBOOK_VIEW => {
            if let Some(tab) = event.get_attribute_value("activeTab")? {
                workbook.active_tab = tab.parse::<usize>()?;
            }
        }
    });
    Ok(workbook)
}

/// Loads the shared string table; workbooks without one yield an empty table.
fn load_shared_strings<RS: Read + Seek>(zip: &mut ZipArchive<RS>) -> Result<Vec<String>, RustySheetMergeError> {
    let mut shared_strings = Vec::<String>::new();
    let mut reader = match zip.xml_reader("xl/sharedStrings.xml")? {
        Some(reader) => reader,
        None => return Ok(shared_strings),
    };
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHARED_STRING_ITEM => {
            shared_strings.push(read_string_value(&mut reader, TAG_SHARED_STRING_ITEM, false)?);
        }
    });
    Ok(shared_strings)
}

/// Loads number formats and cell style indexes from `xl/styles.xml`
///
/// # Returns
/// Vector of CellType values indexed by style ID
fn load_number_formats<RS: Read + Seek>(zip: &mut ZipArchive<RS>, is_1904: bool) -> Result<Vec<CellType>, RustySheetMergeError> {
    let mut reader = match zip.xml_reader("xl/styles.xml")? {
        Some(reader) => reader,
        None => return Ok(Vec::new()),
    };

    let mut custom_formats_context = false;
    let mut custom_formats = HashMap::<String, CellType>::new();

    let mut format_indexes_context = false;
    let mut format_indexes = Vec::<String>::new();

    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_CUSTOM_FORMATS => custom_formats_context = true,
        Event::End(event) if event.name() == TAG_CUSTOM_FORMATS => custom_formats_context = false,
        Event::Start(event) if custom_formats_context && event.name() == TAG_CUSTOM_FORMAT => {
            let id = event.get_attribute_value("numFmtId")?;
            let format = event.get_attribute_value("formatCode")?;
            if let Some((id, format)) = id.zip(format) {
                let style = CellType::parse_custom_number_format(&format, is_1904);
                custom_formats.insert(id.to_string(), style);
            }
        }

        Event::Start(event) if event.name() == TAG_FORMAT_INDEXES => format_indexes_context = true,
        Event::End(event) if event.name() == TAG_FORMAT_INDEXES => {
            format_indexes_context = false;
        }
        Event::Start(event) if format_indexes_context && event.name() == TAG_FORMAT_INDEX => {
            let id = event.get_attribute_value("numFmtId")?.unwrap_or_default();
            format_indexes.push(id.to_string());
        }
    });

    Ok(excel::load_number_formats(format_indexes, custom_formats, is_1904))
}

/// Reads string value from XML content, handling text and CDATA sections
///
/// Skips phonetic annotations; with `is_text_content` the element body itself
/// is the text, otherwise only `<t>` runs are collected.
fn read_string_value<R: BufRead>(
    reader: &mut XmlReader<R>,
    end_tag: QName,
    is_text_content: bool,
) -> Result<String, RustySheetMergeError> {
    let mut is_phonetic_text = false;
    let mut is_text = is_text_content;
    let mut text = String::new();
    match_xml_events!(reader => {
        Event::End(event) if event.name() == end_tag => break,
        Event::Start(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = true,
        Event::End(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = false,
        Event::Start(event) if !is_phonetic_text && event.name() == TAG_TEXT => is_text = true,
        Event::End(event) if is_text && event.name() == TAG_TEXT => is_text = false,
        Event::Text(event) if is_text => text.push_str(&event.xml_content()?),
        Event::CData(event) if is_text => text.push_str(&event.xml_content()?),
        Event::GeneralRef(event) if is_text => text.push_bytes_ref(&event)?,
    });
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(xml: &str) -> Result<String, RustySheetMergeError> {
        let mut reader = XmlReader::new(xml.as_bytes());
        // position after the opening tag
        reader.next()?;
        read_string_value(&mut reader, TAG_SHARED_STRING_ITEM, false)
    }

    #[test]
    fn string_value_concatenates_runs() {
        let text = read("<si><r><t>Комментарий </t></r><r><t>Заказчика</t></r></si>").unwrap();
        assert_eq!(text, "Комментарий Заказчика");
    }

    #[test]
    fn string_value_skips_phonetic_text() {
        let text = read("<si><t>東京</t><rPh sb=\"0\" eb=\"2\"><t>トウキョウ</t></rPh></si>").unwrap();
        assert_eq!(text, "東京");
    }

    #[test]
    fn string_value_keeps_entities() {
        let text = read("<si><t>A &amp; B</t></si>").unwrap();
        assert_eq!(text, "A & B");
    }
}
