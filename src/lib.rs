//! # Rusty Sheet Merge
//!
//! Merges a folder of irregular change-request log workbooks into one
//! normalized table. Every input is a hand-maintained `.xlsx` file whose
//! header may sit anywhere on the sheet and whose columns repeat once per
//! review iteration.
//!
//! ## Features
//!
//! - **Header discovery**: the header row is found by the `№` glyph at the start of a cell
//! - **Iteration sections**: repeated `Дата` columns split the header into per-iteration blocks
//! - **Field reconciliation**: requester, document, dates, comments, responses and the
//!   current status are folded from every section into one record per row
//! - **Stable output**: a fixed canonical column set, or the union of all observed headers
//! - **Fault isolation**: an unreadable or headerless file is logged and skipped
//! - **Pure Rust implementation**: reads Excel Open XML directly with `zip` and `quick-xml`
//!
//! ## Usage
//!
//! ```no_run
//! use rusty_sheet_merge::config::MergeConfig;
//! use rusty_sheet_merge::merge::merge_folder;
//!
//! let report = merge_folder(&MergeConfig::new("logs"))?;
//! println!("{} records written to {}", report.records, report.output.display());
//! # Ok::<(), rusty_sheet_merge::error::RustySheetMergeError>(())
//! ```
pub mod config;
pub mod error;
mod helpers;
pub mod merge;
pub mod spreadsheet;

pub use config::MergeConfig;
pub use error::RustySheetMergeError;
pub use merge::merge_folder;
pub use merge::MergeReport;
