//! Web search backends for Delve.
//!
//! All backends implement the `delve_core::SearchProvider` trait.

pub mod exa;

use std::sync::Arc;

use delve_config::AppConfig;
use delve_core::error::SearchError;
use delve_core::search::SearchProvider;

pub use exa::ExaSearchProvider;

/// Build the configured search backend.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn SearchProvider>, SearchError> {
    match config.search.provider.as_str() {
        "exa" => {
            let api_key = config.search.api_key.clone().ok_or_else(|| {
                SearchError::NotConfigured("no Exa API key (set EXA_API_KEY or search.api_key)".into())
            })?;
            Ok(Arc::new(ExaSearchProvider::from_config(&config.search, api_key)))
        }
        other => Err(SearchError::NotConfigured(format!(
            "unknown search provider '{other}'"
        ))),
    }
}
