//! The merge engine: header discovery, section segmentation, field
//! reconciliation and the folder-level driver.

pub mod driver;
pub mod header;
pub mod parse;
pub mod record;
pub mod schema;
pub mod section;

use thiserror::Error;

pub use driver::merge_folder;
pub use driver::FileExtract;
pub use driver::MergeReport;
pub use record::Record;
pub use record::Status;
pub use schema::CanonicalSchema;

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum MergeError {
    #[error("Folder '{0}' does not exist or is not a directory")]
    FolderNotFound(String),

    #[error("No header cell starting with '{0}'")]
    HeaderNotFound(String),

    #[error("No data below the header")]
    EmptyBody,

    #[error("No row with a numeric record number")]
    NoRecords,
}
