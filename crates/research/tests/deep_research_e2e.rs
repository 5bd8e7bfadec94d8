//! End-to-end tests for the deep research tool.
//!
//! These tests drive the full path from tool arguments to the final payload:
//! planning, concurrent search, learning extraction, recursion, report
//! synthesis, and progress streaming, with scripted generation and search
//! backends in place of the network.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use delve_config::AppConfig;
use delve_core::error::{ProviderError, SearchError, ToolError};
use delve_core::message::Message;
use delve_core::progress::{ProgressEvent, ProgressReporter};
use delve_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use delve_core::research::Source;
use delve_core::search::{SearchOptions, SearchProvider};
use delve_core::tool::{Tool, ToolCall, ToolRegistry};
use delve_research::{DeepResearchArgs, DeepResearchTool};
use tokio::sync::Barrier;

// ── Mock Backends ────────────────────────────────────────────────────────

/// Answers each research call by its schema name.
struct ScriptedResearcher {
    planned: AtomicUsize,
    calls: Mutex<Vec<Option<String>>>,
}

impl ScriptedResearcher {
    fn new() -> Self {
        Self {
            planned: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls_for(&self, schema: Option<&str>) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.as_deref() == schema)
            .count()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedResearcher {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push(request.schema_name().map(String::from));

        let body = match request.schema_name() {
            Some("search_queries") => {
                let first = self.planned.fetch_add(3, Ordering::SeqCst);
                serde_json::json!({
                    "queries": (first..first + 3)
                        .map(|n| serde_json::json!({
                            "query": format!("capital of France {n}"),
                            "researchGoal": format!("Confirm fact {n} about the French capital"),
                        }))
                        .collect::<Vec<_>>()
                })
                .to_string()
            }
            Some("learnings") => serde_json::json!({
                "learnings": [
                    "Paris is the capital of France.",
                    "Paris has an estimated population of 2,102,650 (2023).",
                    "Paris has been the capital since 987 under Hugh Capet.",
                    "The Paris metropolitan area has about 13 million residents.",
                ],
                "followUpQuestions": [
                    "How did Paris become the capital?",
                    "What is the population trend of Paris?",
                    "Which institutions are headquartered in Paris?",
                ],
            })
            .to_string(),
            Some("report_title") => r#"{"title":"Paris: France's Enduring Capital"}"#.to_string(),
            Some(other) => panic!("unexpected schema {other}"),
            None => "# Paris\n\nParis is the capital of France [Wikipedia](https://en.wikipedia.org/wiki/Paris).".to_string(),
        };

        Ok(ProviderResponse {
            message: Message::assistant(body),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model: "mock".into(),
        })
    }
}

/// Returns the same encyclopedia page for every query plus one page unique
/// to the query. Optionally waits at a barrier so a test can prove searches
/// run concurrently.
struct EncyclopediaSearch {
    barrier: Option<Barrier>,
    fail_on: Option<&'static str>,
}

impl EncyclopediaSearch {
    fn new() -> Self {
        Self {
            barrier: None,
            fail_on: None,
        }
    }
}

#[async_trait::async_trait]
impl SearchProvider for EncyclopediaSearch {
    fn name(&self) -> &str {
        "encyclopedia"
    }

    async fn search(&self, query: &str, _options: &SearchOptions) -> Result<Vec<Source>, SearchError> {
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        if self.fail_on.is_some_and(|needle| query.ends_with(needle)) {
            return Err(SearchError::RateLimited { retry_after_secs: 5 });
        }

        Ok(vec![
            Source {
                title: "Paris - Wikipedia".into(),
                url: "https://en.wikipedia.org/wiki/Paris".into(),
                content: "Paris is the capital and largest city of France. With an estimated population of 2,102,650 residents in January 2023 in an area of more than 105 km2.".into(),
                published_date: "2024-11-02T00:00:00.000Z".into(),
                favicon: "https://en.wikipedia.org/static/favicon/wikipedia.ico".into(),
            },
            Source {
                title: format!("Notes on {query}"),
                url: format!("https://example.org/{}", query.replace(' ', "-")),
                content: format!("Background reading on {query}."),
                published_date: String::new(),
                favicon: String::new(),
            },
        ])
    }
}

fn build(search: EncyclopediaSearch) -> (DeepResearchTool, Arc<ScriptedResearcher>) {
    let provider = Arc::new(ScriptedResearcher::new());
    let tool = DeepResearchTool::from_config(&AppConfig::default(), provider.clone(), Arc::new(search));
    (tool, provider)
}

// ── E2E: Full Research Path ──────────────────────────────────────────────

#[tokio::test]
async fn e2e_capital_of_france_through_the_registry() {
    let (tool, provider) = build(EncyclopediaSearch::new());
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(tool));

    let call = ToolCall {
        id: "call_deep_research".into(),
        name: "deep_research".into(),
        arguments: serde_json::json!({"prompt": "What is the capital of France?", "depth": 1, "breadth": 1}),
    };
    let result = registry.execute(&call).await.unwrap();

    assert!(result.success);
    assert_eq!(result.call_id, "call_deep_research");

    let data = result.data.unwrap();
    assert_eq!(data["report"]["title"], "Paris: France's Enduring Capital");
    assert!(data["report"]["report"].as_str().unwrap().contains("Paris"));

    let research = &data["research"];
    assert_eq!(research["searchQueries"], serde_json::json!(["capital of France 0"]));
    assert_eq!(research["learnings"].as_array().unwrap().len(), 3);
    assert_eq!(research["questionsExplored"].as_array().unwrap().len(), 1);

    let sources = research["sources"].as_array().unwrap();
    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0]["content"], "Paris is the capital and largest city of France. W...");
    assert_eq!(sources[0]["publishedDate"], "2024-11-02T00:00:00.000Z");

    // plan, extract, report, title
    assert_eq!(provider.calls_for(Some("search_queries")), 1);
    assert_eq!(provider.calls_for(Some("learnings")), 1);
    assert_eq!(provider.calls_for(None), 1);
    assert_eq!(provider.calls_for(Some("report_title")), 1);
}

#[tokio::test]
async fn e2e_deep_run_dedups_sources_and_streams_progress() {
    let (reporter, mut rx) = ProgressReporter::channel();
    let (tool, provider) = build(EncyclopediaSearch::new());
    let tool = tool.with_reporter(reporter);

    let output = tool
        .run(DeepResearchArgs::new("What is the capital of France?").depth(2).breadth(3))
        .await
        .unwrap();
    drop(tool);

    // Level one plans 3 queries; each child plans with breadth 2 (the scripted
    // planner over-answers with 3, which is cut back to 2).
    assert_eq!(provider.calls_for(Some("search_queries")), 1 + 3);
    assert_eq!(output.research.search_queries.len(), 3 + 3 * 2);

    let urls: HashSet<_> = output.research.sources.iter().map(|s| s.url.as_str()).collect();
    assert_eq!(urls.len(), output.research.sources.len());
    assert_eq!(output.research.sources.len(), 1 + 9);

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    assert_eq!(events.first(), Some(&ProgressEvent::status("Beginning deep research")));
    assert_eq!(events.last(), Some(&ProgressEvent::status("Successfully generated report")));

    // Child sources are announced again by their parent branch.
    let announced = events
        .iter()
        .filter(|e| matches!(e, ProgressEvent::SourceFound { .. }))
        .count();
    assert_eq!(announced, 9 * 2 + 6 * 2);
}

#[tokio::test]
async fn e2e_branches_search_concurrently() {
    let search = EncyclopediaSearch {
        barrier: Some(Barrier::new(3)),
        ..EncyclopediaSearch::new()
    };
    let (tool, _) = build(search);

    // All three searches must be in flight at once to pass the barrier.
    let output = tokio::time::timeout(
        Duration::from_secs(5),
        tool.run(DeepResearchArgs::new("What is the capital of France?").depth(1).breadth(3)),
    )
    .await
    .expect("branches did not run concurrently")
    .unwrap();

    assert_eq!(output.research.search_queries.len(), 3);
}

#[tokio::test]
async fn e2e_one_failed_search_fails_the_run() {
    let search = EncyclopediaSearch {
        fail_on: Some(" 1"),
        ..EncyclopediaSearch::new()
    };
    let (tool, provider) = build(search);

    let err = tool
        .execute(serde_json::json!({"prompt": "What is the capital of France?", "depth": 1, "breadth": 3}))
        .await
        .unwrap_err();

    match err {
        ToolError::ExecutionFailed { tool_name, reason } => {
            assert_eq!(tool_name, "deep_research");
            assert!(reason.contains("capital of France 1"));
        }
        other => panic!("expected ExecutionFailed, got {other:?}"),
    }
    // No report is written for a failed run.
    assert_eq!(provider.calls_for(None), 0);
    assert_eq!(provider.calls_for(Some("report_title")), 0);
}
