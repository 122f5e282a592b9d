//! State module for tracking audit progress
//!
//! # Components
//!
//! - `TargetState`: where a single identifier is in its load/evaluate cycle
//! - `RunPhase`: whether the run is still going or has been finalized, and why

mod run_phase;
mod target_state;

// Re-export main types
pub use run_phase::{FinishReason, RunPhase};
pub use target_state::TargetState;
