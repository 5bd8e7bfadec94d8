//! `delve status` — Show the effective configuration.

use delve_config::AppConfig;

use super::load_config;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let set = |present: bool| if present { "set" } else { "missing" };

    println!("🔎 Delve Status");
    println!("===============");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  Provider:     {}", config.default_provider);
    println!("  Model:        {}", config.default_model);
    println!("  Title model:  {}", config.title_model);
    println!(
        "  Temperature:  {}",
        config
            .default_temperature
            .map_or_else(|| "provider default".to_string(), |t| t.to_string())
    );
    println!("  API key:      {}", set(config.has_api_key()));
    println!("  Search:       {} ({} results, {})", config.search.provider, config.search.num_results, config.search.search_type);
    println!("  Search key:   {}", set(config.has_search_key()));
    println!(
        "  Recency:      {}",
        config
            .search
            .recency_filter
            .map_or_else(|| "none".to_string(), |d| format!("since {d}"))
    );
    println!(
        "  Research:     depth {}, breadth {}, {} learnings per query",
        config.research.default_depth, config.research.default_breadth, config.research.max_learnings
    );
    println!("  Logging:      {}{}", config.logging.level, if config.logging.json { " (json)" } else { "" });

    if AppConfig::config_path().exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file — run `delve onboard` first");
    }

    Ok(())
}
