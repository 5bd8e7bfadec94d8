//! Shared test helpers for research tests.
//!
//! Branches run concurrently, so a queue of scripted replies would hand the
//! wrong answer to the wrong branch. [`RoutingMockProvider`] answers by the
//! requested schema name instead and records every request it saw.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use delve_core::error::{ProviderError, SearchError};
use delve_core::message::Message;
use delve_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use delve_core::research::Source;
use delve_core::search::{SearchOptions, SearchProvider};

type Handler = Box<dyn Fn(&ProviderRequest) -> Result<ProviderResponse, ProviderError> + Send + Sync>;

/// A mock provider that dispatches on `request.schema_name()`.
///
/// Panics if a request arrives for a schema with no handler.
#[derive(Default)]
pub struct RoutingMockProvider {
    schemas: HashMap<String, Handler>,
    text: Option<Handler>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl RoutingMockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_schema(
        mut self,
        name: &str,
        handler: impl Fn(&ProviderRequest) -> Result<ProviderResponse, ProviderError> + Send + Sync + 'static,
    ) -> Self {
        self.schemas.insert(name.to_string(), Box::new(handler));
        self
    }

    pub fn on_text(
        mut self,
        handler: impl Fn(&ProviderRequest) -> Result<ProviderResponse, ProviderError> + Send + Sync + 'static,
    ) -> Self {
        self.text = Some(Box::new(handler));
        self
    }

    /// A provider that answers every research call with well-formed output.
    ///
    /// Plans as many queries as the prompt allows, each with a unique text;
    /// extraction returns five learnings (one duplicated) and five follow-ups
    /// so callers can see the bounds applied.
    pub fn researcher() -> Self {
        let counter = AtomicUsize::new(0);
        Self::new()
            .on_schema("search_queries", move |request| {
                let breadth = requested_max(user_prompt(request), "Return a maximum of ");
                let queries: Vec<_> = (0..breadth)
                    .map(|_| {
                        let n = counter.fetch_add(1, Ordering::SeqCst);
                        serde_json::json!({
                            "query": format!("query {n}"),
                            "researchGoal": format!("goal {n}"),
                        })
                    })
                    .collect();
                Ok(text_response(&serde_json::json!({ "queries": queries }).to_string()))
            })
            .on_schema("learnings", |request| {
                let query = between(user_prompt(request), "<query>", "</query>");
                let body = serde_json::json!({
                    "learnings": [
                        format!("{query}: first"),
                        format!("{query}: first"),
                        format!("{query}: second"),
                        format!("{query}: third"),
                        format!("{query}: fourth"),
                    ],
                    "followUpQuestions": (1..=5)
                        .map(|i| format!("{query}: follow-up {i}"))
                        .collect::<Vec<_>>(),
                });
                Ok(text_response(&body.to_string()))
            })
            .on_schema("report_title", |_| {
                Ok(text_response(r#"{"title":"Paris, Capital of France"}"#))
            })
            .on_text(|_| Ok(text_response("# Report\n\nParis is the capital of France.")))
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests made for `schema` (`None` counts plain text calls).
    pub fn calls_for(&self, schema: Option<&str>) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.schema_name() == schema)
            .count()
    }
}

#[async_trait]
impl Provider for RoutingMockProvider {
    fn name(&self) -> &str {
        "routing_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        let handler = match request.schema_name() {
            Some(name) => self.schemas.get(name),
            None => self.text.as_ref(),
        };
        match handler {
            Some(handler) => handler(&request),
            None => panic!(
                "RoutingMockProvider: no handler for schema {:?}",
                request.schema_name()
            ),
        }
    }
}

/// Create a simple text response.
pub fn text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

pub fn user_prompt(request: &ProviderRequest) -> &str {
    request
        .messages
        .last()
        .map(|m| m.content.as_str())
        .unwrap_or_default()
}

fn between<'a>(text: &'a str, open: &str, close: &str) -> &'a str {
    text.split_once(open)
        .and_then(|(_, rest)| rest.split_once(close))
        .map(|(inner, _)| inner)
        .unwrap_or_default()
}

fn requested_max(text: &str, marker: &str) -> usize {
    text.split_once(marker)
        .and_then(|(_, rest)| rest.split_whitespace().next())
        .and_then(|n| n.parse().ok())
        .unwrap_or(1)
}

/// A search backend that fabricates `per_query` pages for every query.
///
/// Each query gets its own URLs plus one URL shared by every query, so
/// merged research always contains duplicates. Queries containing
/// `fail_on` fail with a network error.
pub struct StaticSearchProvider {
    per_query: usize,
    fail_on: Option<String>,
    queries: Mutex<Vec<String>>,
}

pub const SHARED_URL: &str = "https://en.wikipedia.org/wiki/Paris";

impl StaticSearchProvider {
    pub fn new(per_query: usize) -> Self {
        Self {
            per_query,
            fail_on: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_on(mut self, needle: &str) -> Self {
        self.fail_on = Some(needle.to_string());
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for StaticSearchProvider {
    fn name(&self) -> &str {
        "static_mock"
    }

    async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<Source>, SearchError> {
        self.queries.lock().unwrap().push(query.to_string());

        if self.fail_on.as_deref().is_some_and(|needle| query.contains(needle)) {
            return Err(SearchError::Network(format!("connection reset for {query}")));
        }

        let slug = query.replace(' ', "-");
        let mut sources = vec![Source {
            title: "Paris - Wikipedia".into(),
            url: SHARED_URL.into(),
            content: "Paris is the capital and largest city of France, with an estimated population of 2,102,650.".into(),
            published_date: "2024-11-02T00:00:00.000Z".into(),
            favicon: String::new(),
        }];
        sources.extend((1..self.per_query).map(|i| Source {
            title: format!("{query} result {i}"),
            url: format!("https://example.com/{slug}/{i}"),
            content: format!("Page {i} about {query}. ").repeat(10),
            published_date: String::new(),
            favicon: String::new(),
        }));
        sources.truncate(options.num_results.max(1) as usize);
        Ok(sources)
    }
}
