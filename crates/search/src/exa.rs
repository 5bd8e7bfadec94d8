//! Exa search backend.
//!
//! Calls `POST {api_url}/search` with page contents inlined, so one request
//! yields both the ranking and the text the extractor reads.

use std::time::Duration;

use async_trait::async_trait;
use delve_config::SearchConfig;
use delve_core::error::SearchError;
use delve_core::research::Source;
use delve_core::search::{SearchOptions, SearchProvider};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

/// Exa `/search` client.
pub struct ExaSearchProvider {
    base_url: String,
    api_key: String,
    search_type: String,
    livecrawl: String,
    client: reqwest::Client,
}

impl ExaSearchProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::from_config(&SearchConfig::default(), api_key)
    }

    pub fn from_config(config: &SearchConfig, api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            search_type: config.search_type.clone(),
            livecrawl: config.livecrawl.clone(),
            client,
        }
    }

    fn request_body<'a>(&'a self, query: &'a str, options: &SearchOptions) -> ExaRequest<'a> {
        let tuned = !options.backend_defaults;
        ExaRequest {
            query,
            num_results: options.num_results,
            search_type: tuned.then_some(self.search_type.as_str()),
            start_published_date: options
                .start_published_date
                .map(|d| format!("{}T00:00:00.000Z", d.format("%Y-%m-%d"))),
            contents: ExaContents {
                text: true,
                livecrawl: tuned.then_some(self.livecrawl.as_str()),
            },
        }
    }

    fn map_send_error(e: reqwest::Error) -> SearchError {
        if e.is_timeout() {
            SearchError::Timeout(e.to_string())
        } else {
            SearchError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl SearchProvider for ExaSearchProvider {
    fn name(&self) -> &str {
        "exa"
    }

    async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> std::result::Result<Vec<Source>, SearchError> {
        let url = format!("{}/search", self.base_url);
        let body = self.request_body(query, options);

        debug!(query, num_results = options.num_results, "Sending Exa search request");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(SearchError::RateLimited {
                retry_after_secs: DEFAULT_RETRY_AFTER_SECS,
            });
        }

        if status == 401 || status == 403 {
            return Err(SearchError::AuthenticationFailed(
                "Invalid Exa API key".into(),
            ));
        }

        if !(200..300).contains(&status) {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Exa returned error");
            return Err(SearchError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let parsed: ExaResponse = response
            .json()
            .await
            .map_err(|e| SearchError::InvalidResponse(format!("Failed to parse Exa response: {e}")))?;

        let sources: Vec<Source> = parsed.results.into_iter().map(Source::from).collect();
        debug!(query, results = sources.len(), "Exa search complete");
        Ok(sources)
    }
}

// --- Exa API types (internal) ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExaRequest<'a> {
    query: &'a str,
    num_results: u32,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    search_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_published_date: Option<String>,
    contents: ExaContents<'a>,
}

#[derive(Debug, Serialize)]
struct ExaContents<'a> {
    text: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    livecrawl: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ExaResponse {
    #[serde(default)]
    results: Vec<ExaResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExaResult {
    #[serde(default)]
    title: Option<String>,
    url: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    published_date: Option<String>,
    #[serde(default)]
    favicon: Option<String>,
}

impl From<ExaResult> for Source {
    fn from(r: ExaResult) -> Self {
        Source {
            title: r.title.unwrap_or_default(),
            url: r.url,
            content: r.text.unwrap_or_default(),
            published_date: r.published_date.unwrap_or_default(),
            favicon: r.favicon.unwrap_or_default(),
        }
    }
}
