//! `delve research` — Run a deep research and print the report.
//!
//! Progress streams to stderr while the research runs; the report (or the
//! JSON payload with `--json`) goes to stdout.

use delve_core::progress::{ProgressEvent, ProgressReporter};
use delve_core::research::DeepResearchOutput;
use delve_core::tool::ToolCall;
use delve_research::DeepResearchArgs;
use tracing::info;

use super::{load_config, missing_key};

pub async fn run(
    prompt: String,
    depth: Option<u8>,
    breadth: Option<u8>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;

    if !config.has_api_key() {
        return Err(missing_key(
            "API key",
            &["DELVE_API_KEY", "OPENAI_API_KEY", "OPENROUTER_API_KEY"],
        ));
    }
    if !config.has_search_key() {
        return Err(missing_key("search API key", &["EXA_API_KEY"]));
    }

    let router = delve_providers::router::build_from_config(&config);
    let provider = router.default().ok_or("No default provider configured")?;
    let search = delve_search::build_from_config(&config)?;

    let (reporter, mut events) = ProgressReporter::channel();
    let registry = delve_tools::default_registry(&config, provider, search, reporter);

    let renderer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            eprintln!("{}", render(&event));
        }
    });

    let args = DeepResearchArgs {
        prompt,
        depth,
        breadth,
    };
    let call = ToolCall {
        id: uuid::Uuid::new_v4().to_string(),
        name: "deep_research".into(),
        arguments: serde_json::to_value(&args)?,
    };

    info!(model = %config.default_model, "Starting research");
    let result = registry.execute(&call).await;

    // Dropping the registry drops the last reporter, which ends the stream.
    drop(registry);
    renderer.await?;

    let result = result?;
    let data = result.data.ok_or("deep_research returned no payload")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    let output: DeepResearchOutput = serde_json::from_value(data)?;
    println!("{}", result.output);
    if !output.research.sources.is_empty() {
        println!("\n## Sources\n");
        for source in &output.research.sources {
            let title = if source.title.is_empty() { &source.url } else { &source.title };
            println!("- [{title}]({})", source.url);
        }
    }
    eprintln!(
        "\n  {} learnings from {} queries and {} sources",
        output.research.learnings.len(),
        output.research.search_queries.len(),
        output.research.sources.len()
    );

    Ok(())
}

fn render(event: &ProgressEvent) -> String {
    match event {
        ProgressEvent::Status {
            title,
            description: Some(description),
        } => format!("  ▸ {title}: {description}"),
        ProgressEvent::Status { title, .. } => format!("  ▸ {title}"),
        ProgressEvent::SourceFound { title, url } => format!("      ↳ {title} <{url}>"),
    }
}
