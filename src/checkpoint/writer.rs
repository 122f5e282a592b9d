//! Buffered append streams for the checkpoint logs

use crate::checkpoint::record::{Finding, FindingCategory};
use crate::{CheckpointError, CheckpointResult};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// One append-only log
struct LogStream {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl LogStream {
    fn open(path: &Path) -> CheckpointResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| CheckpointError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    fn append_line(&mut self, line: &str) -> CheckpointResult<()> {
        writeln!(self.writer, "{}", line).map_err(|source| CheckpointError::Write {
            path: self.path.clone(),
            source,
        })
    }

    fn flush(&mut self) -> CheckpointResult<()> {
        self.writer.flush().map_err(|source| CheckpointError::Write {
            path: self.path.clone(),
            source,
        })
    }

    /// Releases the file without writing what is still buffered
    fn discard(self) -> usize {
        let (_file, buffered) = self.writer.into_parts();
        buffered.map(|bytes| bytes.len()).unwrap_or(0)
    }
}

/// Writer side of the checkpoint store
///
/// Owned by the driver alone, so records land in the order they were
/// produced. Nothing is durable until [`flush`](Self::flush) or
/// [`close`](Self::close).
pub struct CheckpointWriter {
    checked: LogStream,
    errors: LogStream,
    error_list: LogStream,
    results: LogStream,
}

impl CheckpointWriter {
    pub(crate) fn open(
        checked: &Path,
        errors: &Path,
        error_list: &Path,
        results: &Path,
    ) -> CheckpointResult<Self> {
        Ok(Self {
            checked: LogStream::open(checked)?,
            errors: LogStream::open(errors)?,
            error_list: LogStream::open(error_list)?,
            results: LogStream::open(results)?,
        })
    }

    /// Marks an identifier as done
    pub fn append_checked(&mut self, id: &str) -> CheckpointResult<()> {
        self.checked.append_line(id)
    }

    /// Records a failed identifier in both the error log and the error list
    pub fn append_error(&mut self, id: &str, detail: &str) -> CheckpointResult<()> {
        let finding = Finding::new(FindingCategory::Error, id, detail);
        self.errors.append_line(&finding.to_log_line())?;
        self.error_list.append_line(id)
    }

    /// Records a finding in the result log
    pub fn append_result(&mut self, finding: &Finding) -> CheckpointResult<()> {
        self.results.append_line(&finding.to_log_line())
    }

    /// Pushes everything buffered so far to disk
    pub fn flush(&mut self) -> CheckpointResult<()> {
        // Results first: an identifier is never checked ahead of its findings
        self.results.flush()?;
        self.errors.flush()?;
        self.error_list.flush()?;
        self.checked.flush()
    }

    /// Flushes and releases all four files
    pub fn close(mut self) -> CheckpointResult<()> {
        self.flush()
    }

    /// Releases all four files, dropping records not yet flushed
    ///
    /// Used when an identifier could not be recorded completely, so none of
    /// its buffered records reach disk. Returns the number of bytes dropped.
    pub fn discard(self) -> usize {
        self.results.discard()
            + self.errors.discard()
            + self.error_list.discard()
            + self.checked.discard()
    }
}
