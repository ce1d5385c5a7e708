//! Folder-level merge: enumerate inputs, extract records file by file, then
//! write one table over the canonical schema.

use crate::config::MergeConfig;
use crate::error::ResultMessage;
use crate::error::RustySheetMergeError;
use crate::merge::header::locate_header;
use crate::merge::header::normalize_header;
use crate::merge::header::NormalizedHeader;
use crate::merge::record::Reconciler;
use crate::merge::record::Record;
use crate::merge::schema::CanonicalSchema;
use crate::merge::section::SectionedBody;
use crate::merge::MergeError;
use crate::spreadsheet::read_active_sheet;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::writer::write_table;
use chrono::Local;
use chrono::NaiveDate;
use std::error::Error;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;
use tracing::info;
use tracing::warn;

/// Records of one input file together with the header they were read through.
#[derive(Clone, Debug)]
pub struct FileExtract {
    /// File stem, the value of the file column
    pub file: String,
    pub header: NormalizedHeader,
    pub records: Vec<Record>,
    /// Why a file with a header contributes no records
    pub skipped: Option<MergeError>,
}

/// Outcome of a merge run.
#[derive(Clone, Debug, Default)]
pub struct MergeReport {
    /// Scanned folder
    pub folder: PathBuf,
    /// Candidate input files found
    pub files_found: usize,
    /// Files that contributed records, in enumeration order
    pub merged: Vec<String>,
    /// Files skipped, with the reason
    pub skipped: Vec<(String, String)>,
    /// Records written
    pub records: usize,
    /// Written workbook
    pub output: PathBuf,
}

/// Output workbook path for a run on `date`.
pub fn output_path(config: &MergeConfig, date: NaiveDate) -> PathBuf {
    config
        .output_dir()
        .join(format!("{} {}.xlsx", config.output_prefix, date.format("%Y-%m-%d")))
}

/// Path of the plain-text log written when a run fails.
pub fn error_log_path(config: &MergeConfig) -> PathBuf {
    config
        .output_dir()
        .join(format!("{} error.log", config.output_prefix))
}

/// Writes the error log of a failed run: timestamp, scanned folder and the
/// error with every source below it. Returns the log path.
pub fn write_error_log(config: &MergeConfig, error: &(dyn Error + 'static)) -> Result<PathBuf, RustySheetMergeError> {
    let mut content = format!(
        "{}\nfolder: {}\nerror: {}\n",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        config.folder.display(),
        error
    );
    let mut source = error.source();
    while let Some(cause) = source {
        content.push_str(&format!("caused by: {cause}\n"));
        source = cause.source();
    }
    let path = error_log_path(config);
    fs::write(&path, content)
        .map_err(RustySheetMergeError::from)
        .with_prefix(&format!("Cannot write '{}'", path.display()))?;
    Ok(path)
}

/// Candidate input files of the configured folder, sorted by name.
pub fn candidate_files(config: &MergeConfig) -> Result<Vec<PathBuf>, RustySheetMergeError> {
    let folder = config.folder.display().to_string();
    if !config.folder.is_dir() {
        return Err(MergeError::FolderNotFound(folder).into());
    }
    let mut files = Vec::new();
    let entries = fs::read_dir(&config.folder)
        .map_err(RustySheetMergeError::from)
        .with_prefix(&format!("Cannot read folder '{folder}'"))?;
    for entry in entries {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if path.is_file() && config.accept(name) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Runs header location, normalization, segmentation and reconciliation on
/// one file. Every failure is specific to that file. A file whose header is
/// found always yields an extract, so its labels reach the union schema even
/// when its body holds no records.
pub fn extract_file(path: &Path, config: &MergeConfig) -> Result<FileExtract, RustySheetMergeError> {
    let file = file_stem(path);
    let sheet = read_active_sheet(path)?;
    let spec = locate_header(&sheet, &config.header_marker);
    if spec.is_empty() {
        return Err(MergeError::HeaderNotFound(config.header_marker.to_owned()).into());
    }
    let header = normalize_header(&spec.labels, &config.section_marker);
    debug!(
        file = sheet.file_name(),
        sheet = sheet.name(),
        anchor = %index_to_reference(spec.row + 1, spec.col + 1),
        columns = header.len(),
        "Header located"
    );

    let (records, skipped) = {
        let body = SectionedBody::new(&sheet, &spec, &header);
        debug!(file = %file, sections = body.sections().len(), "Header segmented");
        if (0..body.sections().len()).all(|index| body.extent(index).is_none()) {
            (Vec::new(), Some(MergeError::EmptyBody))
        } else {
            let records = Reconciler::new(config).records(&body, &file);
            let skipped = records.is_empty().then_some(MergeError::NoRecords);
            (records, skipped)
        }
    };
    Ok(FileExtract {
        file,
        header,
        records,
        skipped,
    })
}

/// Extracts every candidate file. Unreadable and headerless files are left
/// out; files with a header but no records stay in with their skip reason.
pub fn extract_folder(config: &MergeConfig, report: &mut MergeReport) -> Result<Vec<FileExtract>, RustySheetMergeError> {
    let files = candidate_files(config)?;
    report.folder = config.folder.clone();
    report.files_found = files.len();
    info!(folder = %config.folder.display(), files = files.len(), "Scanning folder");

    let mut extracts = Vec::with_capacity(files.len());
    for path in files {
        let name = path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default();
        match extract_file(&path, config) {
            Ok(extract) => {
                match &extract.skipped {
                    Some(reason) => {
                        warn!(file = %name, error = %reason, "Skipping file");
                        report.skipped.push((name, reason.to_string()));
                    }
                    None => {
                        info!(file = %name, records = extract.records.len(), "Merged file");
                        report.merged.push(name);
                    }
                }
                extracts.push(extract);
            }
            Err(e) => {
                warn!(file = %name, error = %e, "Skipping file");
                report.skipped.push((name, e.to_string()));
            }
        }
    }
    Ok(extracts)
}

/// Merges the configured folder into `<prefix> <today>.xlsx`.
pub fn merge_folder(config: &MergeConfig) -> Result<MergeReport, RustySheetMergeError> {
    merge_folder_on(config, Local::now().date_naive())
}

/// Merges the configured folder, stamping the output with `date`.
pub fn merge_folder_on(config: &MergeConfig, date: NaiveDate) -> Result<MergeReport, RustySheetMergeError> {
    let mut report = MergeReport::default();
    let extracts = extract_folder(config, &mut report)?;

    let schema = CanonicalSchema::build(config.schema, extracts.iter().map(|extract| &extract.header));
    let records = extracts.iter().flat_map(|extract| &extract.records);
    let table = schema.table(records, &config.date_format);
    report.records = table.rows.len();

    let output = output_path(config, date);
    let output_dir = config.output_dir();
    fs::create_dir_all(&output_dir)
        .map_err(RustySheetMergeError::from)
        .with_prefix(&format!("Cannot create '{}'", output_dir.display()))?;
    write_table(&output, &table).with_prefix(&format!("Cannot write '{}'", output.display()))?;
    info!(output = %output.display(), records = report.records, "Merged table written");

    report.output = output;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn names_output_artifacts() {
        let config = MergeConfig::new("/data/logs");
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        assert_eq!(output_path(&config, date), PathBuf::from("/data/logs/объединенный файл 2024-03-01.xlsx"));
        assert_eq!(error_log_path(&config), PathBuf::from("/data/logs/объединенный файл error.log"));
    }

    #[test]
    fn enumerates_candidates_sorted() -> Result<(), RustySheetMergeError> {
        let dir = tempfile::tempdir()?;
        for name in ["b.xlsx", "a.xlsx", "notes.txt", "~$a.xlsx", "объединенный файл 2024-01-01.xlsx"] {
            File::create(dir.path().join(name))?;
        }
        fs::create_dir(dir.path().join("nested.xlsx"))?;

        let files = candidate_files(&MergeConfig::new(dir.path()))?;
        let names: Vec<String> = files.iter().map(|path| file_stem(path)).collect();
        assert_eq!(names, ["a", "b"]);
        Ok(())
    }

    #[test]
    fn missing_folder_is_fatal() {
        let result = candidate_files(&MergeConfig::new("/definitely/not/here"));
        assert!(matches!(
            result,
            Err(RustySheetMergeError::MergeError(MergeError::FolderNotFound(_)))
        ));
    }

    #[test]
    fn failed_run_leaves_error_log() -> Result<(), RustySheetMergeError> {
        let dir = tempfile::tempdir()?;
        let missing = dir.path().join("missing");
        let config = MergeConfig {
            output_dir: Some(dir.path().to_path_buf()),
            ..MergeConfig::new(&missing)
        };
        let error = merge_folder(&config).unwrap_err();

        let path = write_error_log(&config, &error)?;
        assert_eq!(path, dir.path().join("объединенный файл error.log"));
        let content = fs::read_to_string(&path)?;
        assert!(content.contains(&format!("folder: {}", missing.display())));
        assert!(content.contains(&MergeError::FolderNotFound(missing.display().to_string()).to_string()));
        Ok(())
    }

    #[test]
    fn unreadable_file_is_skipped() -> Result<(), RustySheetMergeError> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("broken.xlsx"), b"not a zip")?;
        let config = MergeConfig::new(dir.path());
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        let report = merge_folder_on(&config, date)?;
        assert_eq!(report.files_found, 1);
        assert!(report.merged.is_empty());
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].0, "broken.xlsx");
        assert_eq!(report.records, 0);
        assert!(report.output.is_file());
        Ok(())
    }
}
