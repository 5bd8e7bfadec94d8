//! Web search tool — a single search, returned as compact result cards.
//!
//! Unlike `deep_research`, this does no planning or recursion: one query
//! goes to the configured search backend and each page comes back with its
//! text as the snippet, the host as the domain, and its publish date.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use delve_core::error::ToolError;
use delve_core::research::Source;
use delve_core::search::{SearchOptions, SearchProvider};
use delve_core::tool::{Tool, ToolResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const MAX_QUERY_CHARS: usize = 200;
pub const MAX_LIMIT: u32 = 10;
const DEFAULT_LIMIT: u32 = 5;
const MISSING_DATE: &str = "Date not available";

pub struct WebSearchTool {
    search: Arc<dyn SearchProvider>,
    recency_filter: Option<NaiveDate>,
}

impl WebSearchTool {
    pub fn new(search: Arc<dyn SearchProvider>) -> Self {
        Self {
            search,
            recency_filter: None,
        }
    }

    /// Only return pages published on or after `date`.
    pub fn with_recency_filter(mut self, date: Option<NaiveDate>) -> Self {
        self.recency_filter = date;
        self
    }
}

#[derive(Debug, Deserialize)]
struct WebSearchArgs {
    query: String,
    #[serde(default = "default_limit")]
    limit: u32,
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

/// One search hit as returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub domain: String,
    pub date: String,
}

impl From<Source> for SearchResult {
    fn from(source: Source) -> Self {
        let domain = url::Url::parse(&source.url)
            .ok()
            .and_then(|u| u.host_str().map(String::from))
            .unwrap_or_default();
        let date = if source.published_date.is_empty() {
            MISSING_DATE.to_string()
        } else {
            source.published_date
        };

        Self {
            title: source.title,
            url: source.url,
            snippet: source.content,
            domain,
            date,
        }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Use this tool to search the web for information."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "minLength": 1,
                    "maxLength": MAX_QUERY_CHARS,
                    "description": "The search query - be specific and include terms like 'vs', 'features', 'comparison' for better results"
                },
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": MAX_LIMIT,
                    "default": DEFAULT_LIMIT,
                    "description": "The number of results to return"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: WebSearchArgs = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

        let chars = args.query.chars().count();
        if args.query.trim().is_empty() || chars > MAX_QUERY_CHARS {
            return Err(ToolError::InvalidArguments(format!(
                "query must be 1-{MAX_QUERY_CHARS} characters, got {chars}"
            )));
        }
        if !(1..=MAX_LIMIT).contains(&args.limit) {
            return Err(ToolError::InvalidArguments(format!(
                "limit must be 1-{MAX_LIMIT}, got {}",
                args.limit
            )));
        }

        let mut options = SearchOptions::new(args.limit).with_backend_defaults();
        if let Some(date) = self.recency_filter {
            options = options.published_after(date);
        }

        let sources = self
            .search
            .search(&args.query, &options)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.name().to_string(),
                reason: e.to_string(),
            })?;

        let results: Vec<SearchResult> = sources.into_iter().map(SearchResult::from).collect();
        debug!(query = %args.query, results = results.len(), "Web search complete");

        let data = serde_json::to_value(&results).map_err(|e| ToolError::ExecutionFailed {
            tool_name: self.name().to_string(),
            reason: e.to_string(),
        })?;

        Ok(ToolResult {
            call_id: String::new(),
            success: true,
            output: serde_json::to_string_pretty(&results).unwrap_or_default(),
            data: Some(data),
        })
    }
}
