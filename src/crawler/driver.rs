//! Crawl driver - the sequential audit loop
//!
//! This module contains the loop that walks the pending queue, including:
//! - Loading each identifier's page under the session timeout
//! - Attributing queued network findings to the identifier just loaded
//! - Evaluating the page and routing the outcome to the checkpoint logs
//! - Finalizing exactly once, on queue exhaustion or disconnect

use crate::checkpoint::{CheckpointWriter, Finding, FindingCategory};
use crate::crawler::evaluate::PageEvaluator;
use crate::crawler::{AuditOutcome, RunStats};
use crate::detector::IssueDetector;
use crate::output::console;
use crate::session::{site_url, PageLoad, SiteSession};
use crate::state::{FinishReason, RunPhase, TargetState};
use crate::{AuditError, CheckpointError, CheckpointResult, NavigationError};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Drives one audit run over an authenticated session
pub struct Driver<S: SiteSession> {
    session: S,
    detector: IssueDetector,
    writer: Option<CheckpointWriter>,
    evaluator: PageEvaluator,
    node_root: Url,
    shutdown: CancellationToken,
    phase: RunPhase,
}

impl<S: SiteSession> Driver<S> {
    /// Creates a driver
    ///
    /// # Arguments
    ///
    /// * `session` - Logged-in session whose network events feed `detector`
    /// * `detector` - Holds the receiving end of the session's event queue
    /// * `writer` - Append streams for the checkpoint logs
    /// * `evaluator` - Unpublished-marker probe
    /// * `node_root` - Identifiers load from `{node_root}/{id}`
    /// * `shutdown` - Cancelled when the session disconnects
    pub fn new(
        session: S,
        detector: IssueDetector,
        writer: CheckpointWriter,
        evaluator: PageEvaluator,
        node_root: Url,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            session,
            detector,
            writer: Some(writer),
            evaluator,
            node_root,
            shutdown,
            phase: RunPhase::Running,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// URL of an identifier's page
    pub fn target_url(&self, id: &str) -> Result<Url, NavigationError> {
        site_url(&self.node_root, id)
            .map_err(|e| NavigationError::Network(format!("Invalid URL for {}: {}", id, e)))
    }

    /// Runs the audit loop over `pending`, strictly in order
    ///
    /// One identifier is fully resolved and flushed before the next
    /// navigation starts. A disconnect abandons the navigation in flight,
    /// writes nothing for it, and finalizes.
    pub async fn run(mut self, pending: Vec<String>) -> Result<AuditOutcome, AuditError> {
        let shutdown = self.shutdown.clone();
        let mut stats = RunStats::new();
        let mut reason = FinishReason::Completed;

        tracing::info!("Starting audit of {} targets", pending.len());

        for id in &pending {
            if shutdown.is_cancelled() {
                reason = FinishReason::Disconnected;
                break;
            }

            let loaded = match self.target_url(id) {
                Ok(url) => {
                    console::checking(&url);
                    tokio::select! {
                        biased;
                        _ = shutdown.cancelled() => {
                            let dropped = self.detector.discard();
                            tracing::warn!(
                                "Session disconnected while loading {} ({} events dropped)",
                                id,
                                dropped
                            );
                            reason = FinishReason::Disconnected;
                            break;
                        }
                        loaded = self.load(&url) => loaded,
                    }
                }
                Err(e) => Err(e),
            };

            match self.resolve(id, loaded, &mut stats) {
                Ok(state) => {
                    debug_assert!(state.is_terminal(), "{} left in {}", id, state);
                    tracing::debug!("{} resolved as {}", id, state);
                }
                Err(e) => {
                    tracing::error!("Checkpoint write failed at {}: {}", id, e);
                    if let Err(close_err) = self.finalize(FinishReason::Aborted, &stats) {
                        tracing::error!("Could not release checkpoint logs: {}", close_err);
                    }
                    self.session.terminate().await;
                    return Err(e.into());
                }
            }

            if stats.checked % 10 == 0 {
                tracing::info!(
                    "Progress: {} of {} targets checked, {:.2} targets/sec",
                    stats.checked,
                    pending.len(),
                    stats.rate()
                );
            }
        }

        self.finalize(reason, &stats)?;
        self.session.terminate().await;

        Ok(match reason {
            FinishReason::Completed => AuditOutcome::Completed(stats),
            _ => AuditOutcome::Interrupted(stats),
        })
    }

    /// Loads a page under the session's navigation timeout
    async fn load(&mut self, url: &Url) -> Result<PageLoad, NavigationError> {
        let limit = self.session.navigation_timeout();
        match tokio::time::timeout(limit, self.session.navigate(url)).await {
            Ok(result) => result,
            Err(_) => Err(NavigationError::Timeout(limit)),
        }
    }

    /// Records the outcome of one identifier and flushes it
    fn resolve(
        &mut self,
        id: &str,
        loaded: Result<PageLoad, NavigationError>,
        stats: &mut RunStats,
    ) -> CheckpointResult<TargetState> {
        let writer = self.writer.as_mut().ok_or(CheckpointError::Closed)?;
        let mut state = TargetState::Loading;

        // Findings go down before the checked entry
        for finding in self.detector.drain(id) {
            console::finding(&finding);
            writer.append_result(&finding)?;
            stats.record_finding(&finding);
        }

        let page = loaded.and_then(|page| {
            if page.is_ok() {
                Ok(page)
            } else {
                Err(NavigationError::Status(page.status))
            }
        });

        match page {
            Ok(page) => {
                state = step(id, state, TargetState::Evaluating);
                if self.evaluator.is_unpublished(&page.body) {
                    let finding = Finding::new(FindingCategory::UnpublishedPage, id, "");
                    console::finding(&finding);
                    writer.append_result(&finding)?;
                    stats.record_finding(&finding);
                }
                writer.append_checked(id)?;
                stats.record_success();
                console::page_ok();
                state = step(id, state, TargetState::Success);
            }
            Err(error) => {
                console::page_failed(&error);
                writer.append_error(id, &error.to_string())?;
                stats.record_failure();
                state = step(id, state, TargetState::Failure);
            }
        }

        writer.flush()?;
        Ok(state)
    }

    /// Prints the summary and closes the checkpoint streams, once
    ///
    /// An aborted run drops whatever is still buffered instead of flushing
    /// it. Returns `Ok(false)` without doing anything if the run was already
    /// finalized.
    pub fn finalize(&mut self, reason: FinishReason, stats: &RunStats) -> CheckpointResult<bool> {
        if !self.phase.finalize(reason) {
            tracing::debug!(
                "Run already finalized ({:?}); ignoring {} request",
                self.phase.reason(),
                reason
            );
            return Ok(false);
        }

        console::print_summary(stats, reason);
        match (self.writer.take(), reason) {
            // Everything resolved earlier is already flushed; what is left
            // belongs to the identifier that failed to record
            (Some(writer), FinishReason::Aborted) => {
                let dropped = writer.discard();
                tracing::warn!("Dropped {} unflushed checkpoint bytes", dropped);
            }
            (Some(writer), _) => writer.close()?,
            (None, _) => {}
        }
        tracing::info!("Run finalized ({})", reason);
        Ok(true)
    }
}

fn step(id: &str, from: TargetState, to: TargetState) -> TargetState {
    debug_assert!(from.can_transition_to(to), "{}: {} -> {}", id, from, to);
    tracing::trace!("{}: {} -> {}", id, from, to);
    to
}
