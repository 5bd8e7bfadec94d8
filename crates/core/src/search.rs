//! SearchProvider trait — the abstraction over web search backends.
//!
//! One call performs one search and returns provider-ranked pages with their
//! text content. No deduplication happens at this layer.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use crate::error::SearchError;
use crate::research::Source;

/// Per-call search parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// How many results to request
    pub num_results: u32,

    /// Only return pages published on or after this date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_published_date: Option<NaiveDate>,

    /// Leave ranking and crawl policy to the backend's own defaults
    #[serde(default)]
    pub backend_defaults: bool,
}

impl SearchOptions {
    pub fn new(num_results: u32) -> Self {
        Self {
            num_results,
            start_published_date: None,
            backend_defaults: false,
        }
    }

    pub fn published_after(mut self, date: NaiveDate) -> Self {
        self.start_published_date = Some(date);
        self
    }

    /// Skip the configured search type and crawl policy for this call.
    pub fn with_backend_defaults(mut self) -> Self {
        self.backend_defaults = true;
        self
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self::new(3)
    }
}

/// The core SearchProvider trait.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// A human-readable name for this backend (e.g., "exa").
    fn name(&self) -> &str;

    /// Run one search.
    async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> std::result::Result<Vec<Source>, SearchError>;
}
