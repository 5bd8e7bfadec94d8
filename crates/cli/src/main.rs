//! Delve CLI — the main entry point.
//!
//! Commands:
//! - `research` — Run a deep research and print the report
//! - `search`   — Run a single web search
//! - `onboard`  — Initialize config
//! - `status`   — Show the effective configuration
//! - `doctor`   — Diagnose setup and connectivity

use clap::{Parser, Subcommand};
use delve_config::{AppConfig, LoggingConfig};

mod commands;

#[derive(Parser)]
#[command(
    name = "delve",
    about = "Delve — recursive deep research from the command line",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Research a topic in depth and write a report
    Research {
        /// What to research
        prompt: String,

        /// Levels of follow-up research (1-3)
        #[arg(short, long)]
        depth: Option<u8>,

        /// Search queries per level (1-5)
        #[arg(short, long)]
        breadth: Option<u8>,

        /// Print the full JSON payload instead of the markdown report
        #[arg(long)]
        json: bool,
    },

    /// Search the web once
    Search {
        /// The search query
        query: String,

        /// Number of results (1-10)
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Initialize configuration
    Onboard,

    /// Show the effective configuration
    Status,

    /// Diagnose setup and connectivity
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logging settings come from the config file when it loads cleanly;
    // commands report config errors themselves.
    let logging = AppConfig::load().map(|c| c.logging).unwrap_or_default();
    init_tracing(cli.verbose, &logging);

    match cli.command {
        Commands::Research {
            prompt,
            depth,
            breadth,
            json,
        } => commands::research::run(prompt, depth, breadth, json).await?,
        Commands::Search { query, limit } => commands::search::run(query, limit).await?,
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Status => commands::status::run().await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise `--verbose` means debug, else the config level.
fn init_tracing(verbose: bool, logging: &LoggingConfig) {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
