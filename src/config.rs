//! Run configuration for a merge.

use crate::error::RustySheetMergeError;
use glob::Pattern;
use std::path::PathBuf;

/// How the output column set is derived.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SchemaPolicy {
    /// The fixed list of canonical record fields
    #[default]
    Fixed,
    /// The file column followed by every normalized header label seen, first-seen order
    Union,
}

/// Ordered candidate column names for each looked-up record field.
#[derive(Clone, Debug)]
pub struct FieldCandidates {
    pub requester: Vec<String>,
    pub commenter: Vec<String>,
    pub document: Vec<String>,
    pub document_section: Vec<String>,
    pub sheet: Vec<String>,
}

/// Label prefixes that classify columns into the three status groups.
#[derive(Clone, Debug)]
pub struct ColumnGroups {
    /// Customer comment columns
    pub comment: String,
    /// Organization response columns
    pub response: String,
    /// Status columns
    pub status: String,
}

/// Everything a merge run needs to know besides the input itself.
#[derive(Clone, Debug)]
pub struct MergeConfig {
    /// Folder scanned for input workbooks
    pub folder: PathBuf,
    /// Folder receiving the merged workbook and the error log; the input folder when `None`
    pub output_dir: Option<PathBuf>,
    /// File name pattern of candidate inputs
    pub file_pattern: Pattern,
    /// Output file name prefix; inputs starting with it are never merged
    pub output_prefix: String,
    /// Leading glyph of the header anchor cell
    pub header_marker: String,
    /// Label prefix of the repeating date column delimiting iteration sections
    pub section_marker: String,
    /// Cell texts treated as empty, compared case-insensitively after trimming
    pub placeholders: Vec<String>,
    /// Status group prefixes
    pub groups: ColumnGroups,
    /// Candidate names per looked-up field
    pub candidates: FieldCandidates,
    /// Output column policy
    pub schema: SchemaPolicy,
    /// Separator between enumerated aggregated texts
    pub separator: String,
    /// `chrono` format of output dates
    pub date_format: String,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

impl Default for FieldCandidates {
    fn default() -> Self {
        Self {
            requester: strings(&["Запрос от-1", "Запрос от"]),
            commenter: strings(&["Комментатор-1", "Автор комментария-1", "Комментатор", "Автор комментария"]),
            document: strings(&["№ документа-1", "Название документа-1", "№ документа", "Название документа"]),
            document_section: strings(&["Раздел-1", "Раздел документа-1", "Раздел", "Раздел документа"]),
            sheet: strings(&["Лист-1", "Страница-1", "Лист", "Страница"]),
        }
    }
}

impl Default for ColumnGroups {
    fn default() -> Self {
        Self {
            comment: "Комментарий".to_string(),
            response: "Ответ".to_string(),
            status: "Статус".to_string(),
        }
    }
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("."),
            output_dir: None,
            file_pattern: Pattern::new("*.xlsx").expect("Hardcode glob pattern"),
            output_prefix: "объединенный файл".to_string(),
            header_marker: "№".to_string(),
            section_marker: "Дата".to_string(),
            placeholders: strings(&["nan", "none"]),
            groups: ColumnGroups::default(),
            candidates: FieldCandidates::default(),
            schema: SchemaPolicy::default(),
            separator: "\n".to_string(),
            date_format: "%d-%m-%Y".to_string(),
        }
    }
}

impl MergeConfig {
    /// Default configuration scanning `folder`.
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            ..Self::default()
        }
    }

    /// Replaces the candidate file pattern.
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self, RustySheetMergeError> {
        self.file_pattern = Pattern::new(pattern)?;
        Ok(self)
    }

    /// Folder receiving the output workbook and error log.
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| self.folder.clone())
    }

    /// True for values that carry no information: blank or a placeholder token.
    pub fn is_placeholder(&self, value: &str) -> bool {
        let value = value.trim();
        value.is_empty() || self.placeholders.iter().any(|token| token.eq_ignore_ascii_case(value))
    }

    /// Whether a file name is a candidate input.
    pub fn accept(&self, file_name: &str) -> bool {
        self.file_pattern.matches(file_name)
            && !file_name.starts_with(&self.output_prefix)
            && !file_name.starts_with("~$")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_only_candidate_inputs() {
        let config = MergeConfig::default();
        assert!(config.accept("A.xlsx"));
        assert!(!config.accept("notes.txt"));
        assert!(!config.accept("объединенный файл 2024-01-01.xlsx"));
        assert!(!config.accept("~$A.xlsx"));
    }

    #[test]
    fn custom_pattern() {
        let config = MergeConfig::default().with_pattern("*.xls[xm]").unwrap();
        assert!(config.accept("A.xlsm"));
        assert!(MergeConfig::default().with_pattern("[").is_err());
    }

    #[test]
    fn placeholders() {
        let config = MergeConfig::default();
        assert!(config.is_placeholder(" NaN "));
        assert!(config.is_placeholder("None"));
        assert!(config.is_placeholder("  "));
        assert!(!config.is_placeholder("ok"));
    }

    #[test]
    fn output_dir_defaults_to_folder() {
        let mut config = MergeConfig::new("in");
        assert_eq!(config.output_dir(), PathBuf::from("in"));
        config.output_dir = Some(PathBuf::from("out"));
        assert_eq!(config.output_dir(), PathBuf::from("out"));
    }
}
