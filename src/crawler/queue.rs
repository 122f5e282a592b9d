//! Target list loading and pending-queue computation

use crate::checkpoint::{read_identifiers, CheckpointStore};
use crate::crawler::AuditOptions;
use crate::CheckpointResult;
use std::collections::HashSet;
use std::path::Path;

/// Loads the full audit scope
///
/// One identifier per line, trimmed, blank lines dropped. A missing file is
/// an empty scope.
pub fn load_targets(path: &Path) -> CheckpointResult<Vec<String>> {
    read_identifiers(path)
}

/// Targets not yet in the resume set, in their original order
pub fn pending_queue(targets: Vec<String>, resume: &HashSet<String>) -> Vec<String> {
    targets
        .into_iter()
        .filter(|target| !resume.contains(target))
        .collect()
}

/// Runs the start-of-run file steps and returns what is left to audit
///
/// 1. Create any missing checkpoint log
/// 2. Truncate all logs when `clear_data` is set
/// 3. Read the resume set (plus the error list with `skip_errors`)
/// 4. Subtract it from the target list
pub fn prepare_pending(
    store: &CheckpointStore,
    targets: &Path,
    options: &AuditOptions,
) -> CheckpointResult<Vec<String>> {
    store.ensure_files()?;

    if options.clear_data {
        store.clear()?;
    }

    let resume = store.load_resume_set(options.skip_errors)?;
    let targets = load_targets(targets)?;
    let total = targets.len();
    let pending = pending_queue(targets, &resume);

    tracing::debug!(
        "{} targets, {} in resume set, {} pending",
        total,
        resume.len(),
        pending.len()
    );

    Ok(pending)
}
