use thiserror::Error;

/// Main error type for the sheet merge crate.
/// Aggregates errors from various sources including standard library, dependencies, and internal modules.
#[derive(Error, Debug)]
pub enum RustySheetMergeError {
    #[error("{0}")]
    WithContextError(String),

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    #[error("{0}")]
    ParseFloatError(#[from] std::num::ParseFloatError),

    #[error("{0}")]
    ParseDateTimeError(#[from] chrono::ParseError),

    #[error("{0}")]
    PatternError(#[from] glob::PatternError),

    // Third-party library errors
    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    #[error("{0}")]
    XlsxWriterError(#[from] rust_xlsxwriter::XlsxError),

    // Helper module errors
    #[error("{0}")]
    XmlHelperError(#[from] crate::helpers::xml::XmlError),

    // Spreadsheet module errors
    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    // Merge module errors
    #[error("{0}")]
    MergeError(#[from] crate::merge::MergeError),
}

pub trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, RustySheetMergeError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| RustySheetMergeError::WithContextError(format!("{}: {}", message, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_prefix_keeps_ok() {
        let result: Result<usize, RustySheetMergeError> = Ok(3);
        assert_eq!(result.with_prefix("ignored").unwrap(), 3);
    }

    #[test]
    fn with_prefix_wraps_error() {
        let result: Result<usize, RustySheetMergeError> = "x".parse::<usize>().map_err(Into::into);
        let message = result.with_prefix("read 'a.xlsx'").unwrap_err().to_string();
        assert!(message.starts_with("read 'a.xlsx': "));
    }
}
