//! In-memory run counters

use crate::checkpoint::{Finding, FindingCategory};
use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};

/// Totals for one run, threaded through the driver loop
///
/// Reset every run; only the checkpoint logs survive between runs.
#[derive(Debug, Clone)]
pub struct RunStats {
    /// Identifiers resolved this run, success or failure
    pub checked: u64,
    pub success: u64,
    pub failure: u64,
    /// Successful pages carrying the unpublished marker
    pub unpublished: u64,
    pub blockable: u64,
    pub optionally_blockable: u64,
    pub started_at: DateTime<Utc>,
    started: Instant,
}

impl RunStats {
    pub fn new() -> Self {
        Self {
            checked: 0,
            success: 0,
            failure: 0,
            unpublished: 0,
            blockable: 0,
            optionally_blockable: 0,
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }

    /// Counts a finding against its category
    pub fn record_finding(&mut self, finding: &Finding) {
        match finding.category {
            FindingCategory::Blockable => self.blockable += 1,
            FindingCategory::OptionallyBlockable => self.optionally_blockable += 1,
            FindingCategory::UnpublishedPage => self.unpublished += 1,
            // Failures are counted when the identifier resolves
            FindingCategory::Error => {}
        }
    }

    pub fn record_success(&mut self) {
        self.checked += 1;
        self.success += 1;
    }

    pub fn record_failure(&mut self) {
        self.checked += 1;
        self.failure += 1;
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Identifiers per second since the run started
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed().as_secs_f64();
        if secs > 0.0 {
            self.checked as f64 / secs
        } else {
            0.0
        }
    }
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}
