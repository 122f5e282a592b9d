use std::fmt;

/// Why a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// The pending queue was exhausted
    Completed,

    /// The session went away (browser closed, Ctrl-C) before the queue ran out
    Disconnected,

    /// A checkpoint write failed and progress could no longer be recorded
    Aborted,
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Disconnected => write!(f, "disconnected"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

/// One-shot lifecycle of a run
///
/// Both the normal end of the queue and a forced disconnect try to
/// finalize; only the first attempt moves the phase out of `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    #[default]
    Running,
    Finalized(FinishReason),
}

impl RunPhase {
    /// Moves to `Finalized(reason)` if still running.
    ///
    /// Returns `true` only for the call that performed the transition.
    pub fn finalize(&mut self, reason: FinishReason) -> bool {
        match self {
            Self::Running => {
                *self = Self::Finalized(reason);
                true
            }
            Self::Finalized(_) => false,
        }
    }

    pub fn reason(&self) -> Option<FinishReason> {
        match self {
            Self::Running => None,
            Self::Finalized(reason) => Some(*reason),
        }
    }
}
