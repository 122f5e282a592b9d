//! Aggregation of the raw logs into a per-identifier tally
//!
//! A stateless fold over the result log and the error list. Identifiers
//! appear in the order their bucket was first created: error-list entries
//! first, then result-log entries.

use crate::checkpoint::{Finding, FindingCategory};
use std::collections::HashMap;

/// Table header, in column order
pub const TALLY_HEADER: [&str; 6] = [
    "ID",
    "Blockable",
    "Optionally Blockable",
    "Published",
    "Unpublished",
    "Error",
];

/// Per-identifier tally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TallyRecord {
    pub blockable: u64,
    pub optionally_blockable: u64,
    pub published: bool,
    pub error: bool,
}

impl TallyRecord {
    fn new(error: bool) -> Self {
        Self {
            blockable: 0,
            optionally_blockable: 0,
            published: true,
            error,
        }
    }
}

/// Grand totals across all identifiers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TallyTotals {
    pub blockable: u64,
    pub optionally_blockable: u64,
    /// Buckets still published after folding
    pub published: u64,
    /// Unpublished rows seen
    pub unpublished: u64,
    /// Distinct erroring identifiers
    pub errors: u64,
}

/// The aggregated report
#[derive(Debug, Clone, Default)]
pub struct TallyReport {
    rows: Vec<(String, TallyRecord)>,
    index: HashMap<String, usize>,
    totals: TallyTotals,
}

impl TallyReport {
    pub fn get(&self, id: &str) -> Option<&TallyRecord> {
        self.index.get(id).map(|&i| &self.rows[i].1)
    }

    pub fn totals(&self) -> TallyTotals {
        self.totals
    }

    /// Rows in bucket-creation order
    pub fn rows(&self) -> &[(String, TallyRecord)] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Header, synthetic `Total` row, then one row per identifier
    pub fn to_table(&self) -> Vec<Vec<String>> {
        let mut table = Vec::with_capacity(self.rows.len() + 2);
        table.push(TALLY_HEADER.iter().map(|h| h.to_string()).collect());
        table.push(vec![
            "Total".to_string(),
            self.totals.blockable.to_string(),
            self.totals.optionally_blockable.to_string(),
            self.totals.published.to_string(),
            self.totals.unpublished.to_string(),
            self.totals.errors.to_string(),
        ]);
        for (id, record) in &self.rows {
            table.push(vec![
                id.clone(),
                record.blockable.to_string(),
                record.optionally_blockable.to_string(),
                record.published.to_string(),
                (!record.published).to_string(),
                record.error.to_string(),
            ]);
        }
        table
    }

    /// Returns the bucket for `id`, creating it if absent. The flag tells
    /// whether it was created by this call.
    fn bucket(&mut self, id: &str, error: bool) -> (&mut TallyRecord, bool) {
        if let Some(i) = self.index.get(id).copied() {
            return (&mut self.rows[i].1, false);
        }
        let i = self.rows.len();
        self.index.insert(id.to_string(), i);
        self.rows.push((id.to_string(), TallyRecord::new(error)));
        (&mut self.rows[i].1, true)
    }
}

/// Folds the result log and error list into a tally
///
/// # Rules
///
/// - Every error-list identifier gets a bucket with `error = true`; the
///   Errors total counts distinct identifiers.
/// - `Unpublished Page` rows flip `published` off and bump the Unpublished
///   total, without touching content counters.
/// - Mixed-content rows bump the bucket's counter and the matching total.
/// - Rows without an identifier, and rows with a category that does not
///   belong in the result log, are skipped.
/// - The Published total is the number of buckets still published at the end.
pub fn aggregate(results: &str, error_list: &str) -> TallyReport {
    let mut report = TallyReport::default();

    for id in error_list.lines().map(str::trim).filter(|id| !id.is_empty()) {
        let (_, created) = report.bucket(id, true);
        if created {
            report.totals.errors += 1;
        }
    }

    for line in results.lines() {
        let Some((label, id, _)) = Finding::split_log_line(line) else {
            continue;
        };
        let category = match FindingCategory::from_label(label) {
            Some(FindingCategory::Error) | None => {
                tracing::warn!("Skipping result row with category '{}' for {}", label, id);
                continue;
            }
            Some(category) => category,
        };

        let (record, _) = report.bucket(id, false);
        match category {
            FindingCategory::UnpublishedPage => {
                record.published = false;
                report.totals.unpublished += 1;
            }
            FindingCategory::Blockable => {
                record.blockable += 1;
                report.totals.blockable += 1;
            }
            FindingCategory::OptionallyBlockable => {
                record.optionally_blockable += 1;
                report.totals.optionally_blockable += 1;
            }
            FindingCategory::Error => {}
        }
    }

    report.totals.published = report.rows.iter().filter(|(_, r)| r.published).count() as u64;
    report
}
