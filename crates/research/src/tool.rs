//! The `deep_research` tool: validate arguments, run the recursive research,
//! synthesize a report, and shape the payload for the caller.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use delve_config::AppConfig;
use delve_core::error::{ResearchError, ToolError};
use delve_core::progress::ProgressReporter;
use delve_core::provider::Provider;
use delve_core::research::{DeepResearchOutput, Research};
use delve_core::search::{SearchOptions, SearchProvider};
use delve_core::tool::{Tool, ToolResult};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::generate::Generator;
use crate::orchestrator::ResearchOrchestrator;
use crate::synthesizer::ReportSynthesizer;

pub const MAX_PROMPT_CHARS: usize = 1000;
pub const MAX_DEPTH: u8 = 3;
pub const MAX_BREADTH: u8 = 5;

const DEFAULT_DEPTH: u8 = 1;
const DEFAULT_BREADTH: u8 = 3;
const DEFAULT_PREVIEW_CHARS: usize = 50;

/// Arguments accepted by `deep_research`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeepResearchArgs {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breadth: Option<u8>,
}

impl DeepResearchArgs {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            depth: None,
            breadth: None,
        }
    }

    pub fn depth(mut self, depth: u8) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn breadth(mut self, breadth: u8) -> Self {
        self.breadth = Some(breadth);
        self
    }
}

pub struct DeepResearchTool {
    orchestrator: ResearchOrchestrator,
    synthesizer: ReportSynthesizer,
    reporter: ProgressReporter,
    default_depth: u8,
    default_breadth: u8,
    preview_chars: usize,
}

impl DeepResearchTool {
    pub fn new(orchestrator: ResearchOrchestrator, synthesizer: ReportSynthesizer) -> Self {
        Self {
            orchestrator,
            synthesizer,
            reporter: ProgressReporter::noop(),
            default_depth: DEFAULT_DEPTH,
            default_breadth: DEFAULT_BREADTH,
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }

    /// Wire every component from configuration.
    pub fn from_config(
        config: &AppConfig,
        provider: Arc<dyn Provider>,
        search: Arc<dyn SearchProvider>,
    ) -> Self {
        let writer = Generator::new(provider, &config.default_model)
            .with_temperature(config.default_temperature)
            .with_max_tokens(config.default_max_tokens);
        let titler = writer.for_model(&config.title_model);

        let mut search_options = SearchOptions::new(config.search.num_results);
        if let Some(date) = config.search.recency_filter {
            search_options = search_options.published_after(date);
        }

        let research = &config.research;
        let orchestrator = ResearchOrchestrator::new(writer.clone(), search)
            .with_search_options(search_options)
            .with_max_learnings(research.max_learnings)
            .with_source_pace(Duration::from_millis(research.source_pace_ms));
        let synthesizer =
            ReportSynthesizer::new(writer, titler).with_citation_chars(research.citation_chars);

        let mut tool = Self::new(orchestrator, synthesizer);
        tool.default_depth = research.default_depth;
        tool.default_breadth = research.default_breadth;
        tool.preview_chars = research.preview_chars;
        tool
    }

    /// Send progress events to `reporter` instead of discarding them.
    pub fn with_reporter(mut self, reporter: ProgressReporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Run a full deep research: traverse, synthesize, and shape the output.
    pub async fn run(&self, args: DeepResearchArgs) -> Result<DeepResearchOutput, ResearchError> {
        let (depth, breadth) = self.validate(&args)?;
        let prompt = args.prompt.as_str();
        let reporter = &self.reporter;

        info!(depth, breadth, "Beginning deep research");
        reporter.status("Beginning deep research");
        let research = self
            .orchestrator
            .research(prompt, depth, breadth, Research::new(), reporter)
            .await?;

        reporter.status("Generating report");
        let report = self.synthesizer.synthesize(prompt, &research).await?;
        reporter.status("Successfully generated report");

        let sources = research
            .distinct_sources()
            .iter()
            .map(|s| s.preview(self.preview_chars))
            .collect();

        Ok(DeepResearchOutput {
            report,
            research: Research { sources, ..research },
        })
    }

    fn validate(&self, args: &DeepResearchArgs) -> Result<(usize, usize), ResearchError> {
        let chars = args.prompt.chars().count();
        if !(1..=MAX_PROMPT_CHARS).contains(&chars) {
            return Err(ResearchError::InvalidInput(format!(
                "prompt must be 1-{MAX_PROMPT_CHARS} characters, got {chars}"
            )));
        }

        let depth = args.depth.unwrap_or(self.default_depth);
        if !(1..=MAX_DEPTH).contains(&depth) {
            return Err(ResearchError::InvalidInput(format!(
                "depth must be 1-{MAX_DEPTH}, got {depth}"
            )));
        }

        let breadth = args.breadth.unwrap_or(self.default_breadth);
        if !(1..=MAX_BREADTH).contains(&breadth) {
            return Err(ResearchError::InvalidInput(format!(
                "breadth must be 1-{MAX_BREADTH}, got {breadth}"
            )));
        }

        Ok((depth.into(), breadth.into()))
    }
}

#[async_trait]
impl Tool for DeepResearchTool {
    fn name(&self) -> &str {
        "deep_research"
    }

    fn description(&self) -> &str {
        "Use this tool to conduct a deep research on a given topic."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "prompt": {
                    "type": "string",
                    "minLength": 1,
                    "maxLength": MAX_PROMPT_CHARS,
                    "description": "This should take the user's exact prompt. Extract from the context but do not infer or change in any way."
                },
                "depth": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": MAX_DEPTH,
                    "default": DEFAULT_DEPTH,
                    "description": "Default to 1 unless the user specifically references otherwise"
                },
                "breadth": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": MAX_BREADTH,
                    "default": DEFAULT_BREADTH,
                    "description": "Default to 3 unless the user specifically references otherwise"
                }
            },
            "required": ["prompt"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: DeepResearchArgs = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

        let output = self.run(args).await.map_err(|e| match e {
            ResearchError::InvalidInput(reason) => ToolError::InvalidArguments(reason),
            other => ToolError::ExecutionFailed {
                tool_name: self.name().to_string(),
                reason: other.to_string(),
            },
        })?;

        let data = serde_json::to_value(&output).map_err(|e| ToolError::ExecutionFailed {
            tool_name: self.name().to_string(),
            reason: e.to_string(),
        })?;

        Ok(ToolResult {
            call_id: String::new(),
            success: true,
            output: format!("# {}\n\n{}", output.report.title, output.report.report),
            data: Some(data),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{RoutingMockProvider, SHARED_URL, StaticSearchProvider};
    use delve_core::progress::ProgressEvent;
    use std::collections::HashSet;

    fn build(search: StaticSearchProvider) -> (DeepResearchTool, Arc<RoutingMockProvider>) {
        let provider = Arc::new(RoutingMockProvider::researcher());
        let config = AppConfig::default();
        let tool = DeepResearchTool::from_config(&config, provider.clone(), Arc::new(search));
        (tool, provider)
    }

    #[tokio::test]
    async fn output_sources_are_distinct_previews() {
        let (tool, _) = build(StaticSearchProvider::new(3));
        let output = tool.run(DeepResearchArgs::new("capital of France").depth(2).breadth(3)).await.unwrap();

        let sources = &output.research.sources;
        let urls: HashSet<_> = sources.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(urls.len(), sources.len());
        assert_eq!(sources[0].url, SHARED_URL);
        assert!(sources.iter().all(|s| s.content.ends_with("...")));
        assert!(sources.iter().all(|s| s.content.chars().count() <= 53));
        assert!(!output.report.title.is_empty());
        assert!(!output.report.report.is_empty());
    }

    #[tokio::test]
    async fn defaults_are_depth_one_breadth_three() {
        let (tool, provider) = build(StaticSearchProvider::new(1));
        let output = tool.run(DeepResearchArgs::new("capital of France")).await.unwrap();

        assert_eq!(provider.calls_for(Some("search_queries")), 1);
        assert_eq!(output.research.search_queries.len(), 3);
    }

    #[tokio::test]
    async fn boundary_statuses_bracket_the_run() {
        let (reporter, mut rx) = ProgressReporter::channel();
        let (tool, _) = build(StaticSearchProvider::new(1));
        let tool = tool.with_reporter(reporter);
        tool.run(DeepResearchArgs::new("capital of France").breadth(1)).await.unwrap();
        drop(tool);

        let mut titles = Vec::new();
        while let Some(event) = rx.recv().await {
            if let ProgressEvent::Status { title, .. } = event {
                titles.push(title);
            }
        }
        assert_eq!(titles.first().map(String::as_str), Some("Beginning deep research"));
        let n = titles.len();
        assert_eq!(titles[n - 2], "Generating report");
        assert_eq!(titles[n - 1], "Successfully generated report");
    }

    #[tokio::test]
    async fn invalid_arguments_are_rejected_before_any_call() {
        let (tool, provider) = build(StaticSearchProvider::new(1));

        for args in [
            DeepResearchArgs::new(""),
            DeepResearchArgs::new("x".repeat(1001)),
            DeepResearchArgs::new("topic").depth(0),
            DeepResearchArgs::new("topic").depth(4),
            DeepResearchArgs::new("topic").breadth(0),
            DeepResearchArgs::new("topic").breadth(6),
        ] {
            let err = tool.run(args).await.unwrap_err();
            assert!(matches!(err, ResearchError::InvalidInput(_)));
        }
        assert!(provider.requests().is_empty());

        assert!(tool.run(DeepResearchArgs::new("x".repeat(1000)).depth(1).breadth(1)).await.is_ok());
    }

    #[tokio::test]
    async fn whitespace_prompt_is_within_bounds() {
        let (tool, _) = build(StaticSearchProvider::new(1));
        assert!(tool.run(DeepResearchArgs::new(" ").depth(1).breadth(1)).await.is_ok());
    }

    #[tokio::test]
    async fn execute_maps_errors_to_tool_errors() {
        let (tool, _) = build(StaticSearchProvider::new(1).fail_on("query"));

        let err = tool.execute(serde_json::json!({"depth": 1})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));

        let err = tool
            .execute(serde_json::json!({"prompt": "topic", "depth": 9}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(msg) if msg.contains("depth")));

        let err = tool.execute(serde_json::json!({"prompt": "topic"})).await.unwrap_err();
        assert!(matches!(err, ToolError::ExecutionFailed { tool_name, .. } if tool_name == "deep_research"));
    }

    #[tokio::test]
    async fn execute_returns_payload() {
        let (tool, _) = build(StaticSearchProvider::new(2));
        let result = tool
            .execute(serde_json::json!({"prompt": "capital of France", "depth": 1, "breadth": 1}))
            .await
            .unwrap();

        assert!(result.success);
        assert!(result.output.starts_with("# Paris, Capital of France"));
        let data = result.data.unwrap();
        assert_eq!(data["report"]["title"], "Paris, Capital of France");
        assert_eq!(data["research"]["searchQueries"], serde_json::json!(["query 0"]));
        assert!(data["research"]["questionsExplored"].as_array().unwrap().len() <= 3);
    }

    #[test]
    fn tool_definition() {
        let (tool, _) = build(StaticSearchProvider::new(1));
        let def = tool.to_definition();
        assert_eq!(def.name, "deep_research");
        assert_eq!(def.description, "Use this tool to conduct a deep research on a given topic.");
        assert_eq!(def.parameters["required"], serde_json::json!(["prompt"]));
        assert_eq!(def.parameters["properties"]["breadth"]["maximum"], 5);
    }
}
