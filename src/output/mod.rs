//! Output module for operator-facing reporting
//!
//! This module handles:
//! - Coloured progress lines and the end-of-run summary
//! - Aggregating the raw logs into a per-identifier tally
//! - Writing the tally as a flat CSV table

pub mod console;
mod table;
mod tally;

pub use table::{format_csv, write_csv};
pub use tally::{aggregate, TallyRecord, TallyReport, TallyTotals, TALLY_HEADER};

use crate::checkpoint::read_log;
use crate::config::FilesConfig;
use crate::AuditError;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Runs the aggregation stage over the configured logs
///
/// Reads the result log and error list, writes the tally table to
/// `files.tally`, and returns the report.
pub fn export_tally(files: &FilesConfig) -> Result<TallyReport, AuditError> {
    let results = read_log(&files.results)?;
    let error_list = read_log(&files.error_list)?;

    tracing::info!(
        "Aggregating {} and {}",
        files.results.display(),
        files.error_list.display()
    );
    let report = aggregate(&results, &error_list);

    write_csv(&report.to_table(), &files.tally)?;
    Ok(report)
}
