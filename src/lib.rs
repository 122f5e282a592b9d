//! Mixed-Audit: a resumable mixed-content auditor
//!
//! This crate walks a fixed list of content-page identifiers on one site,
//! records insecure sub-resource findings and publication status, and keeps
//! append-only checkpoint logs so an interrupted audit can pick up where it
//! stopped. A separate pass folds those logs into a per-identifier tally.

pub mod checkpoint;
pub mod config;
pub mod crawler;
pub mod detector;
pub mod output;
pub mod session;
pub mod state;

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main error type for audit operations
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Invalid selector '{0}'")]
    Selector(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Failures while establishing the site session. Always fatal for the run.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Status code: {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Request to {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },

    #[error("No login form with fields '{username_field}' and '{password_field}' at {url}")]
    MissingLoginForm {
        url: String,
        username_field: String,
        password_field: String,
    },

    #[error("Cannot build site URL for '{path}': {source}")]
    InvalidUrl {
        path: String,
        source: ::url::ParseError,
    },

    #[error("Log in failed: expected {expected}, landed on {actual}")]
    Rejected { expected: String, actual: String },
}

/// Per-identifier navigation failures
///
/// The `Display` text is what lands in the detail field of the error log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("Status code: {0}")]
    Status(u16),

    #[error("Navigation timeout of {} ms exceeded", .0.as_millis())]
    Timeout(Duration),

    #[error("{0}")]
    Network(String),
}

/// Checkpoint file errors
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Checkpoint streams already closed")]
    Closed,
}

/// Result type alias for audit operations
pub type Result<T> = std::result::Result<T, AuditError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for checkpoint operations
pub type CheckpointResult<T> = std::result::Result<T, CheckpointError>;

// Re-export commonly used types
pub use checkpoint::{CheckpointStore, Finding, FindingCategory};
pub use config::Config;
pub use crawler::{run_audit, AuditOptions, AuditOutcome, RunStats};
pub use output::{aggregate, TallyReport};
pub use state::{RunPhase, TargetState};
