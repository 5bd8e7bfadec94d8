//! `delve search` — Run a single web search and print the results.

use delve_core::progress::ProgressReporter;
use delve_core::tool::ToolCall;
use delve_tools::SearchResult;

use super::{load_config, missing_key};

pub async fn run(query: String, limit: Option<u32>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;

    if !config.has_search_key() {
        return Err(missing_key("search API key", &["EXA_API_KEY"]));
    }

    let router = delve_providers::router::build_from_config(&config);
    let provider = router.default().ok_or("No default provider configured")?;
    let search = delve_search::build_from_config(&config)?;
    let registry = delve_tools::default_registry(&config, provider, search, ProgressReporter::noop());

    let mut arguments = serde_json::json!({ "query": query });
    if let Some(limit) = limit {
        arguments["limit"] = serde_json::json!(limit);
    }
    let call = ToolCall {
        id: uuid::Uuid::new_v4().to_string(),
        name: "web_search".into(),
        arguments,
    };

    let result = registry.execute(&call).await?;
    let cards: Vec<SearchResult> =
        serde_json::from_value(result.data.ok_or("web_search returned no payload")?)?;

    if cards.is_empty() {
        println!("No results for \"{query}\"");
        return Ok(());
    }

    for (i, card) in cards.iter().enumerate() {
        println!("{}. {}", i + 1, card.title);
        println!("   {} · {}", card.domain, card.date);
        println!("   {}", card.url);
        let snippet: String = card.snippet.chars().take(200).collect();
        if !snippet.is_empty() {
            println!("   {}", snippet.replace('\n', " "));
        }
        println!();
    }

    Ok(())
}
