/// Per-identifier state definitions
///
/// Every identifier moves `Loading -> Evaluating -> Success`, or drops to
/// `Failure` straight from `Loading`.
use std::fmt;

/// Represents where one identifier is in the audit cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetState {
    // ===== Active States =====
    /// Navigation to the page is in flight
    Loading,

    /// The page answered OK and is being inspected
    Evaluating,

    // ===== Terminal States =====
    /// Recorded in the checked log (unpublished pages end here too)
    Success,

    /// Recorded in the error log and error list
    Failure,
}

impl TargetState {
    /// Returns true once the identifier has been fully resolved
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failure)
    }

    /// Whether `self -> next` is a legal step
    pub fn can_transition_to(&self, next: TargetState) -> bool {
        matches!(
            (self, next),
            (Self::Loading, Self::Evaluating)
                | (Self::Loading, Self::Failure)
                | (Self::Evaluating, Self::Success)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Evaluating => "evaluating",
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
