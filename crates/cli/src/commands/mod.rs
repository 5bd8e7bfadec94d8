//! CLI subcommand implementations.

pub mod doctor;
pub mod onboard;
pub mod research;
pub mod search;
pub mod status;

use delve_config::AppConfig;

/// Load the config, or explain why it could not be loaded.
pub(crate) fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}

/// Print setup guidance for a missing key and return the error to surface.
pub(crate) fn missing_key(what: &str, variables: &[&str]) -> Box<dyn std::error::Error> {
    eprintln!();
    eprintln!("  ERROR: No {what} configured!");
    eprintln!();
    eprintln!("  Set one of these environment variables:");
    for variable in variables {
        eprintln!("    {variable}");
    }
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!("    {}", AppConfig::config_path().display());
    eprintln!();
    format!("No {what} found. See above for setup instructions.").into()
}
