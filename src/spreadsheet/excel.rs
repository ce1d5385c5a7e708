//! Microsoft Office Open XML package helpers
use crate::error::RustySheetMergeError;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::path::Path;
use zip::ZipArchive;

/// Buffered reader over a local spreadsheet file
pub(crate) type FileReader = BufReader<File>;

/// XML tag name for relationship elements in Excel files
const TAG_RELATIONSHIP: &[u8] = b"Relationship";

/// Signature of OLE compound files (legacy `.xls` and encrypted `.xlsx`)
const COMPOUND_FILE_SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Opens an Excel package as a ZIP archive.
///
/// Encrypted workbooks are stored as OLE compound files rather than ZIP
/// packages; they are reported with a dedicated error instead of a bare ZIP failure.
pub(super) fn open(path: &Path) -> Result<ZipArchive<FileReader>, RustySheetMergeError> {
    let mut reader = BufReader::new(File::open(path)?);
    if is_compound_file(&mut reader)? {
        Err(SpreadsheetError::CompoundFileError(path.display().to_string()))?;
    }
    Ok(ZipArchive::new(reader)?)
}

/// Loads worksheet relationships from a package relationship part
///
/// # Returns
/// Mapping of relationship IDs to worksheet paths inside the archive
pub(super) fn load_relationships<RS: Read + Seek>(zip: &mut ZipArchive<RS>, path: &str) -> Result<HashMap<String, String>, RustySheetMergeError> {
    let mut reader = zip.xml_reader(path)?
        .ok_or_else(|| SpreadsheetError::FileError(path.to_string()))?;
    let mut relationships: HashMap<String, String> = HashMap::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let id = event.get_attribute_value("Id")?;
            let kind = event.get_attribute_value("Type")?;
            let target = event.get_attribute_value("Target")?;
            // Only worksheet relationships
            if kind.map(|it| it.ends_with("/worksheet")).unwrap_or(true) {
                if let Some((id, target)) = id.zip(target) {
                    relationships.insert(id.to_string(), to_zip_path(&target));
                }
            }
        }
    });
    Ok(relationships)
}

/// Maps style format indexes to cell types using custom and built-in formats
pub(super) fn load_number_formats(format_indexes: Vec<String>, custom_formats: HashMap<String, CellType>, is_1904: bool) -> Vec<CellType> {
    format_indexes
        .iter()
        .map(|id| {
            custom_formats
                .get(id)
                .copied()
                .or_else(|| CellType::parse_builtin_number_format_id(id, is_1904))
                .unwrap_or(CellType::Number)
        })
        .collect()
}

/// Normalizes a relationship target to a path inside the `xl/` folder of the archive
pub(super) fn to_zip_path(path: &str) -> String {
    if let Some(stripped) = path.strip_prefix('/') {
        stripped.to_string()
    } else if path.starts_with("xl/") {
        path.to_string()
    } else {
        format!("xl/{path}")
    }
}

/// Checks the file signature for an OLE compound document, then rewinds.
fn is_compound_file<R: Read + Seek>(reader: &mut R) -> Result<bool, RustySheetMergeError> {
    let mut signature = [0u8; 8];
    let matched = match reader.read_exact(&mut signature) {
        Ok(()) => signature == COMPOUND_FILE_SIGNATURE,
        Err(_) => false,
    };
    reader.seek(SeekFrom::Start(0))?;
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn zip_paths() {
        assert_eq!(to_zip_path("worksheets/sheet1.xml"), "xl/worksheets/sheet1.xml");
        assert_eq!(to_zip_path("/xl/worksheets/sheet2.xml"), "xl/worksheets/sheet2.xml");
        assert_eq!(to_zip_path("xl/worksheets/sheet3.xml"), "xl/worksheets/sheet3.xml");
    }

    #[test]
    fn number_formats() {
        let custom = HashMap::from([("164".to_string(), CellType::NumberDate1900)]);
        let formats = load_number_formats(vec!["0".into(), "164".into(), "22".into()], custom, false);
        assert_eq!(formats, vec![CellType::Number, CellType::NumberDate1900, CellType::NumberDateTime1900]);
    }

    #[test]
    fn compound_signature() {
        let mut ole = Cursor::new(COMPOUND_FILE_SIGNATURE.to_vec());
        assert!(is_compound_file(&mut ole).unwrap());
        let mut zip = Cursor::new(b"PK\x03\x04rest".to_vec());
        assert!(!is_compound_file(&mut zip).unwrap());
        let mut short = Cursor::new(vec![0xD0]);
        assert!(!is_compound_file(&mut short).unwrap());
        assert_eq!(short.position(), 0);
    }
}
