//! `delve doctor` — Diagnose setup and connectivity.

use delve_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Delve Doctor — System Diagnostics");
    println!("====================================\n");

    let mut issues = 0;

    if AppConfig::config_path().exists() {
        println!("  ✅ Config file found");
    } else {
        println!("  ⚠️  No config file — run `delve onboard` (defaults and env vars still apply)");
        issues += 1;
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  1 blocking issue found. Fix the config and re-run.");
            return Ok(());
        }
    };

    if config.has_api_key() {
        println!("  ✅ Model API key configured");
    } else {
        println!("  ❌ No model API key — set api_key or OPENAI_API_KEY");
        issues += 1;
    }

    if config.has_search_key() {
        println!("  ✅ Search API key configured");
    } else {
        println!("  ❌ No search API key — set [search] api_key or EXA_API_KEY");
        issues += 1;
    }

    if let Err(e) = delve_search::build_from_config(&config) {
        if config.has_search_key() {
            println!("  ❌ Search backend unavailable: {e}");
            issues += 1;
        }
    }

    let router = delve_providers::router::build_from_config(&config);
    match router.default() {
        Some(provider) if config.has_api_key() => match provider.health_check().await {
            Ok(true) => {
                println!("  ✅ Provider '{}' reachable", provider.name());
                match provider.list_models().await {
                    Ok(models) if models.iter().any(|m| m == &config.default_model) => {
                        println!("  ✅ Model '{}' available", config.default_model);
                    }
                    Ok(models) if !models.is_empty() => {
                        println!("  ⚠️  Model '{}' not listed by provider", config.default_model);
                        issues += 1;
                    }
                    _ => {}
                }
            }
            Ok(false) => {
                println!("  ❌ Provider '{}' rejected the health check", provider.name());
                issues += 1;
            }
            Err(e) => {
                println!("  ❌ Provider '{}' unreachable: {e}", provider.name());
                issues += 1;
            }
        },
        Some(_) => println!("  ⏭  Skipping provider check (no API key)"),
        None => {
            println!("  ❌ No default provider configured");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
