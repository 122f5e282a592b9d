//! Issue detector: turns network events into mixed-content findings
//!
//! The detector owns the receiving end of the session's event queue. It
//! has no idea where one page ends and the next begins; the driver tells it
//! which identifier is current when it drains. Because the driver drains
//! after every navigation and never overlaps two navigations, every event
//! in the queue at drain time belongs to the identifier just loaded.

use crate::checkpoint::{Finding, FindingCategory};
use crate::session::{BlockedReason, EventReceiver, MixedContentType, NetworkEvent, RequestId};
use std::collections::HashMap;

pub struct IssueDetector {
    events: EventReceiver,
    /// URLs of requests announced since the last drain, for naming blocked loads
    requests: HashMap<RequestId, String>,
}

impl IssueDetector {
    pub fn new(events: EventReceiver) -> Self {
        Self {
            events,
            requests: HashMap::new(),
        }
    }

    /// Classifies every queued event as a finding for `id`
    ///
    /// Findings come back in the order their events arrived, one per
    /// blocked load and one per optionally-blockable request.
    pub fn drain(&mut self, id: &str) -> Vec<Finding> {
        let mut findings = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            if let Some(finding) = self.classify(event, id) {
                findings.push(finding);
            }
        }
        self.requests.clear();
        findings
    }

    /// Drops queued events without attributing them
    ///
    /// Used when a navigation is abandoned mid-flight. Returns how many
    /// events were dropped.
    pub fn discard(&mut self) -> usize {
        let mut dropped = 0;
        while self.events.try_recv().is_ok() {
            dropped += 1;
        }
        self.requests.clear();
        dropped
    }

    fn classify(&mut self, event: NetworkEvent, id: &str) -> Option<Finding> {
        match event {
            NetworkEvent::RequestWillBeSent {
                request_id,
                url,
                mixed_content,
            } => {
                let finding = (mixed_content == MixedContentType::OptionallyBlockable)
                    .then(|| Finding::new(FindingCategory::OptionallyBlockable, id, url.as_str()));
                self.requests.insert(request_id, url);
                finding
            }
            NetworkEvent::LoadingFailed {
                request_id,
                blocked_reason: Some(BlockedReason::MixedContent),
            } => {
                let url = self.requests.get(&request_id).cloned().unwrap_or_else(|| {
                    tracing::warn!("Blocked request {} was never announced", request_id);
                    request_id.clone()
                });
                Some(Finding::new(FindingCategory::Blockable, id, url))
            }
            NetworkEvent::LoadingFailed { request_id, .. } => {
                tracing::trace!("Request {} failed for a non mixed-content reason", request_id);
                None
            }
        }
    }
}
