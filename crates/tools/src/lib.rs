//! Built-in tool implementations for Delve.
//!
//! Two tools are exposed to a chat host:
//! - `deep_research`: the full recursive research run, ending in a report
//! - `web_search`: a single search returning result cards

pub mod web_search;

use std::sync::Arc;

use delve_config::AppConfig;
use delve_core::progress::ProgressReporter;
use delve_core::provider::Provider;
use delve_core::search::SearchProvider;
use delve_core::tool::ToolRegistry;
use delve_research::DeepResearchTool;

pub use web_search::{SearchResult, WebSearchTool};

/// Create a tool registry with every built-in tool wired from `config`.
///
/// Progress from `deep_research` runs goes to `reporter`.
pub fn default_registry(
    config: &AppConfig,
    provider: Arc<dyn Provider>,
    search: Arc<dyn SearchProvider>,
    reporter: ProgressReporter,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(
        WebSearchTool::new(search.clone()).with_recency_filter(config.search.recency_filter),
    ));
    registry.register(Box::new(
        DeepResearchTool::from_config(config, provider, search).with_reporter(reporter),
    ));
    registry
}
