//! `delve onboard` — First-time setup.

use delve_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = AppConfig::config_path();

    println!("🔎 Delve — First-Time Setup");
    println!("===========================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Created config.toml at: {}", config_path.display());
        println!("\n📝 Next steps:");
        println!("   1. Add your model API key (api_key, or OPENAI_API_KEY)");
        println!("   2. Add your Exa API key ([search] api_key, or EXA_API_KEY)");
        println!("   3. Run: delve doctor\n");
    }

    println!("🎉 Setup complete! Run `delve research \"<topic>\"` to start.\n");

    Ok(())
}
