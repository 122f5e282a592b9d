//! Flat CSV table output (RFC 4180 quoting)

use crate::output::OutputResult;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Escapes a field for CSV according to RFC 4180
fn escape_csv(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Renders rows as CSV text, newline-separated, without a trailing newline
pub fn format_csv(rows: &[Vec<String>]) -> String {
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|field| escape_csv(field))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Writes rows to `path`, creating parent directories and replacing any
/// previous file
pub fn write_csv(rows: &[Vec<String>], path: &Path) -> OutputResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(format_csv(rows).as_bytes())?;
    writer.flush()?;

    tracing::info!("Table saved to {}", path.display());
    Ok(())
}
