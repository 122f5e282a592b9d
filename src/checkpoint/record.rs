//! Line format of the result and error logs
//!
//! Records are `category,identifier,detail` with no quoting. The detail is
//! always the last field, so a detail containing commas is recovered intact
//! by splitting on the first two commas only. An identifier or category
//! containing a comma cannot be represented; existing logs never contain one.

use std::fmt;

/// Kind of a recorded finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FindingCategory {
    /// Insecure resource the browser refused to load
    Blockable,
    /// Insecure resource the browser loaded with a warning
    OptionallyBlockable,
    /// Page carries the unpublished marker
    UnpublishedPage,
    /// Page could not be audited
    Error,
}

impl FindingCategory {
    /// Label used in the log files and tally header
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blockable => "Blockable",
            Self::OptionallyBlockable => "Optionally Blockable",
            Self::UnpublishedPage => "Unpublished Page",
            Self::Error => "Error",
        }
    }

    /// Parses a log label; returns None for anything unknown
    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "Blockable" => Some(Self::Blockable),
            "Optionally Blockable" => Some(Self::OptionallyBlockable),
            "Unpublished Page" => Some(Self::UnpublishedPage),
            "Error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One immutable observation about one identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub category: FindingCategory,
    pub id: String,
    pub detail: String,
}

impl Finding {
    pub fn new(category: FindingCategory, id: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            category,
            id: id.into(),
            detail: detail.into(),
        }
    }

    /// Renders the record without a trailing newline
    pub fn to_log_line(&self) -> String {
        format!("{},{},{}", self.category, self.id, self.detail)
    }

    /// Parses a raw log line into its three fields
    ///
    /// Returns the category label unparsed so callers can decide what to do
    /// with labels they do not know. Lines without an identifier yield None.
    pub fn split_log_line(line: &str) -> Option<(&str, &str, &str)> {
        let line = line.trim_end_matches(['\r', '\n']);
        let mut fields = line.splitn(3, ',');
        let category = fields.next()?;
        let id = fields.next()?;
        let detail = fields.next().unwrap_or("");
        if id.is_empty() {
            return None;
        }
        Some((category, id, detail))
    }
}
