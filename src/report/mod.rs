//! Spreadsheet report assembly
//!
//! Each harvest run lands in a date-named sheet of a single workbook. As long
//! as the target set keeps the same content hash the workbook is extended;
//! when the hash changes the workbook is replaced. Saving is atomic: the
//! workbook is written to a temp file and renamed over the old one, so a
//! crash mid-write never corrupts an existing report.

mod merger;
mod style;

pub use merger::{merge, REPORT_FILE_NAME};

use thiserror::Error;

/// Report assembly and persistence errors
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to open report workbook {path}: {message}")]
    Open { path: String, message: String },

    #[error("Failed to write report workbook {path}: {message}")]
    Write { path: String, message: String },

    #[error("Workbook error: {0}")]
    Sheet(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
