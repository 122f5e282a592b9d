//! Low-level network signals observed while a page loads
//!
//! The shapes mirror what a browser's devtools network domain reports: a
//! request announcement carrying the browser's mixed-content verdict, and a
//! load failure carrying the reason the request was blocked.

use tokio::sync::mpsc;

/// Opaque per-request identifier, unique within a session
pub type RequestId = String;

/// Sending half of the network event queue, held by the session backend
pub type EventSender = mpsc::UnboundedSender<NetworkEvent>;

/// Receiving half of the network event queue, held by the issue detector
pub type EventReceiver = mpsc::UnboundedReceiver<NetworkEvent>;

/// Creates the single ordered queue between a session and the detector
pub fn event_queue() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Mixed-content verdict attached to an outgoing request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixedContentType {
    /// Secure request, or an insecure page where nothing is mixed
    None,
    /// Insecure script-like resource; the browser refuses to load it
    Blockable,
    /// Insecure passive resource (images, media); loaded with a warning
    OptionallyBlockable,
}

/// Why a request failed to load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockedReason {
    MixedContent,
    Other(String),
}

/// A network event, in the order the page produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkEvent {
    RequestWillBeSent {
        request_id: RequestId,
        url: String,
        mixed_content: MixedContentType,
    },
    LoadingFailed {
        request_id: RequestId,
        blocked_reason: Option<BlockedReason>,
    },
}
