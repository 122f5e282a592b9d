//! Checkpoint file locations, startup reads and the clear operation

use crate::checkpoint::writer::CheckpointWriter;
use crate::config::FilesConfig;
use crate::{CheckpointError, CheckpointResult};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// The four checkpoint logs of one audit
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    checked: PathBuf,
    errors: PathBuf,
    error_list: PathBuf,
    results: PathBuf,
}

impl CheckpointStore {
    pub fn new(files: &FilesConfig) -> Self {
        Self {
            checked: files.checked.clone(),
            errors: files.errors.clone(),
            error_list: files.error_list.clone(),
            results: files.results.clone(),
        }
    }

    pub fn checked_path(&self) -> &Path {
        &self.checked
    }

    pub fn errors_path(&self) -> &Path {
        &self.errors
    }

    pub fn error_list_path(&self) -> &Path {
        &self.error_list
    }

    pub fn results_path(&self) -> &Path {
        &self.results
    }

    fn all_paths(&self) -> [(&'static str, &Path); 4] {
        [
            ("checked pages progress", &self.checked),
            ("error log", &self.errors),
            ("error list", &self.error_list),
            ("results", &self.results),
        ]
    }

    /// Creates any missing log (and its parent directories) as an empty file
    pub fn ensure_files(&self) -> CheckpointResult<()> {
        for (_, path) in self.all_paths() {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|source| CheckpointError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| CheckpointError::Write {
                    path: path.to_path_buf(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Truncates all four logs to zero length
    ///
    /// Irreversible. Call before anything has been read in the run.
    pub fn clear(&self) -> CheckpointResult<()> {
        for (label, path) in self.all_paths() {
            OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)
                .map_err(|source| CheckpointError::Write {
                    path: path.to_path_buf(),
                    source,
                })?;
            tracing::info!("Cleared {} ({})", label, path.display());
        }
        Ok(())
    }

    /// Identifiers that need no further work this run
    ///
    /// Always the checked log; the error list too when `include_errors` is set.
    pub fn load_resume_set(&self, include_errors: bool) -> CheckpointResult<HashSet<String>> {
        let mut resume: HashSet<String> = read_identifiers(&self.checked)?.into_iter().collect();
        if include_errors {
            resume.extend(read_identifiers(&self.error_list)?);
        }
        Ok(resume)
    }

    /// Opens all four logs for appending
    pub fn open_writer(&self) -> CheckpointResult<CheckpointWriter> {
        CheckpointWriter::open(&self.checked, &self.errors, &self.error_list, &self.results)
    }
}

/// Reads a newline-delimited identifier list
///
/// Lines are trimmed and blank lines dropped. A missing file reads as empty;
/// any other read failure is an error.
pub fn read_identifiers(path: &Path) -> CheckpointResult<Vec<String>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(CheckpointError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Reads a whole log as text, missing file reading as empty
pub fn read_log(path: &Path) -> CheckpointResult<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(source) => Err(CheckpointError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> CheckpointStore {
        CheckpointStore::new(&FilesConfig {
            targets: dir.path().join("total.txt"),
            checked: dir.path().join("checked.txt"),
            errors: dir.path().join("errors.txt"),
            error_list: dir.path().join("error-list.txt"),
            results: dir.path().join("results.txt"),
            tally: dir.path().join("todo.csv"),
        })
    }

    #[test]
    fn test_missing_files_read_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert!(store.load_resume_set(true).unwrap().is_empty());
    }

    #[test]
    fn test_ensure_files_creates_nested_paths() {
        let dir = TempDir::new().unwrap();
        let store = CheckpointStore::new(&FilesConfig {
            targets: dir.path().join("total.txt"),
            checked: dir.path().join("nested/deeper/checked.txt"),
            errors: dir.path().join("errors.txt"),
            error_list: dir.path().join("error-list.txt"),
            results: dir.path().join("results.txt"),
            tally: dir.path().join("todo.csv"),
        });

        store.ensure_files().unwrap();
        assert!(store.checked_path().exists());
        assert!(store.results_path().exists());
    }

    #[test]
    fn test_resume_set_with_and_without_errors() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.checked_path(), "1\n2\n").unwrap();
        fs::write(store.error_list_path(), "3\n").unwrap();

        let without = store.load_resume_set(false).unwrap();
        assert_eq!(without.len(), 2);
        assert!(!without.contains("3"));

        let with = store.load_resume_set(true).unwrap();
        assert_eq!(with.len(), 3);
        assert!(with.contains("3"));
    }

    #[test]
    fn test_clear_then_load_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.checked_path(), "1\n2\n").unwrap();
        fs::write(store.errors_path(), "Error,3,Status code: 500\n").unwrap();
        fs::write(store.error_list_path(), "3\n").unwrap();
        fs::write(store.results_path(), "Blockable,1,http://x/a.js\n").unwrap();

        store.clear().unwrap();

        assert!(store.load_resume_set(true).unwrap().is_empty());
        for path in [
            store.checked_path(),
            store.errors_path(),
            store.error_list_path(),
            store.results_path(),
        ] {
            assert_eq!(fs::metadata(path).unwrap().len(), 0);
        }
    }

    #[test]
    fn test_read_identifiers_trims_and_skips_blanks() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ids.txt");
        fs::write(&path, "  10 \r\n\n11\n   \n12").unwrap();

        assert_eq!(read_identifiers(&path).unwrap(), vec!["10", "11", "12"]);
    }

    #[test]
    fn test_unreadable_existing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        // A directory exists at the path but cannot be read as text
        let path = dir.path().join("checked.txt");
        fs::create_dir(&path).unwrap();

        assert!(matches!(
            read_identifiers(&path),
            Err(CheckpointError::Read { .. })
        ));
    }
}
