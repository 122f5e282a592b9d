//! Evaluation of a loaded page

use crate::AuditError;
use scraper::{Html, Selector};

/// Looks for the unpublished marker in a page body
#[derive(Debug, Clone)]
pub struct PageEvaluator {
    unpublished: Selector,
}

impl PageEvaluator {
    pub fn new(unpublished_selector: &str) -> Result<Self, AuditError> {
        let unpublished = Selector::parse(unpublished_selector)
            .map_err(|_| AuditError::Selector(unpublished_selector.to_string()))?;
        Ok(Self { unpublished })
    }

    pub fn is_unpublished(&self, html: &str) -> bool {
        Html::parse_document(html)
            .select(&self.unpublished)
            .next()
            .is_some()
    }
}
