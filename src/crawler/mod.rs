//! Crawler module for the resumable audit run
//!
//! This module contains the core audit logic, including:
//! - Computing the pending queue from the target list and checkpoint logs
//! - Establishing the site session
//! - The sequential driver loop and its one-shot finalize
//! - Run counters

mod driver;
mod evaluate;
mod queue;
mod stats;

pub use driver::Driver;
pub use evaluate::PageEvaluator;
pub use queue::{load_targets, pending_queue, prepare_pending};
pub use stats::RunStats;

use crate::checkpoint::CheckpointStore;
use crate::config::Config;
use crate::detector::IssueDetector;
use crate::output::console;
use crate::session::{event_queue, site_url, Credentials, HttpSession};
use crate::state::FinishReason;
use crate::AuditError;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Start-of-run switches
#[derive(Debug, Clone, Copy, Default)]
pub struct AuditOptions {
    /// Truncate all checkpoint logs before reading anything
    pub clear_data: bool,
    /// Leave identifiers from the error list out of the queue
    pub skip_errors: bool,
}

/// How a run ended
#[derive(Debug, Clone)]
pub enum AuditOutcome {
    /// Every target was already in the resume set; no session was opened
    NoNewTargets,
    /// The pending queue was exhausted
    Completed(RunStats),
    /// The session disconnected first; completed work is on disk
    Interrupted(RunStats),
}

impl AuditOutcome {
    pub fn stats(&self) -> Option<&RunStats> {
        match self {
            Self::NoNewTargets => None,
            Self::Completed(stats) | Self::Interrupted(stats) => Some(stats),
        }
    }
}

/// Runs a complete audit
///
/// 1. Prepare the checkpoint files and compute the pending queue
/// 2. Stop with `NoNewTargets` if nothing is pending, before any network use
/// 3. Log in; failure is fatal
/// 4. Drive the queue until it is exhausted or `shutdown` fires
///
/// # Arguments
///
/// * `config` - The audit configuration
/// * `root` - Site root, already resolved for the team
/// * `options` - Clear-data and skip-errors switches
/// * `credentials` - Login credentials
/// * `shutdown` - Cancelled on disconnect; forces finalize
pub async fn run_audit(
    config: &Config,
    root: &Url,
    options: &AuditOptions,
    credentials: &Credentials,
    shutdown: CancellationToken,
) -> Result<AuditOutcome, AuditError> {
    let store = CheckpointStore::new(&config.files);

    console::notice("Checking for files...");
    if options.clear_data {
        console::notice("Clear data flag enabled. Clearing...");
    }
    console::notice("Loading files...");
    let pending = prepare_pending(&store, &config.files.targets, options)?;

    if pending.is_empty() {
        console::alert("No new nodes to check.");
        return Ok(AuditOutcome::NoNewTargets);
    }
    console::notice(&format!("{} nodes to check", pending.len()));

    let evaluator = PageEvaluator::new(&config.session.unpublished_selector)?;
    let node_root = site_url(root, &config.session.node_path)?;

    console::notice(&format!(
        "Logging into {}",
        site_url(root, &config.session.login_path)?
    ));
    let (events, receiver) = event_queue();
    let login = HttpSession::login(root, &config.session, credentials, events);
    let session = tokio::select! {
        biased;
        _ = shutdown.cancelled() => {
            tracing::warn!("Disconnected before login completed");
            let stats = RunStats::new();
            console::print_summary(&stats, FinishReason::Disconnected);
            return Ok(AuditOutcome::Interrupted(stats));
        }
        result = login => match result {
            Ok(session) => {
                console::login_succeeded();
                session
            }
            Err(e) => {
                console::login_failed(&e);
                return Err(e.into());
            }
        },
    };

    let writer = store.open_writer()?;
    Driver::new(
        session,
        IssueDetector::new(receiver),
        writer,
        evaluator,
        node_root,
        shutdown,
    )
    .run(pending)
    .await
}
