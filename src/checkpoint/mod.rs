//! Checkpoint module for persisting audit progress
//!
//! Four append-only text logs are the only state that survives between runs:
//! - checked log: one identifier per line, written on success
//! - error log: `Error,<id>,<detail>` records
//! - error list: bare identifiers that failed
//! - result log: `<category>,<id>,<detail>` findings
//!
//! They are read once at startup to compute the resume set and appended to
//! during the run.

mod record;
mod store;
mod writer;

pub use record::{Finding, FindingCategory};
pub use store::{read_identifiers, read_log, CheckpointStore};
pub use writer::CheckpointWriter;
