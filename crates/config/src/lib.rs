//! Configuration loading, validation, and management for Delve.
//!
//! Loads configuration from `~/.delve/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.delve/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the generation provider (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default generation provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Model used for planning, extraction, and the report body
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Model used for the report title
    #[serde(default = "default_title_model")]
    pub title_model: String,

    /// Sampling temperature; unset for reasoning models that reject it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_temperature: Option<f32>,

    /// Max tokens per generation; unset to use the provider's default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_max_tokens: Option<u32>,

    /// Request timeout for generation calls
    #[serde(default = "default_provider_timeout")]
    pub provider_timeout_secs: u64,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// Web search configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// Research traversal defaults and limits
    #[serde(default)]
    pub research: ResearchConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_model() -> String {
    "o3-mini".into()
}
fn default_title_model() -> String {
    "gpt-4o-mini".into()
}
fn default_provider_timeout() -> u64 {
    120
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("title_model", &self.title_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("provider_timeout_secs", &self.provider_timeout_secs)
            .field("providers", &self.providers)
            .field("search", &self.search)
            .field("research", &self.research)
            .field("logging", &self.logging)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// Web search backend settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_provider")]
    pub provider: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_search_url")]
    pub api_url: String,

    /// Results fetched per research query
    #[serde(default = "default_num_results")]
    pub num_results: u32,

    /// Exa search type ("keyword", "neural", "auto")
    #[serde(default = "default_search_type")]
    pub search_type: String,

    /// Exa livecrawl policy ("always", "fallback", "never")
    #[serde(default = "default_livecrawl")]
    pub livecrawl: String,

    /// Only return pages published on or after this date (YYYY-MM-DD)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recency_filter: Option<NaiveDate>,

    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,
}

fn default_search_provider() -> String {
    "exa".into()
}
fn default_search_url() -> String {
    "https://api.exa.ai".into()
}
fn default_num_results() -> u32 {
    3
}
fn default_search_type() -> String {
    "keyword".into()
}
fn default_livecrawl() -> String {
    "always".into()
}
fn default_search_timeout() -> u64 {
    60
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: default_search_provider(),
            api_key: None,
            api_url: default_search_url(),
            num_results: default_num_results(),
            search_type: default_search_type(),
            livecrawl: default_livecrawl(),
            recency_filter: None,
            timeout_secs: default_search_timeout(),
        }
    }
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("provider", &self.provider)
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("num_results", &self.num_results)
            .field("search_type", &self.search_type)
            .field("livecrawl", &self.livecrawl)
            .field("recency_filter", &self.recency_filter)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Traversal defaults and payload limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    #[serde(default = "default_depth")]
    pub default_depth: u8,

    #[serde(default = "default_breadth")]
    pub default_breadth: u8,

    /// Upper bound on learnings extracted per query
    #[serde(default = "default_max_learnings")]
    pub max_learnings: usize,

    /// Delay between successive source events of one branch (UI pacing)
    #[serde(default)]
    pub source_pace_ms: u64,

    /// Source content kept per citation in the report prompt
    #[serde(default = "default_citation_chars")]
    pub citation_chars: usize,

    /// Source content kept per source in the returned payload
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

fn default_depth() -> u8 {
    1
}
fn default_breadth() -> u8 {
    3
}
fn default_max_learnings() -> usize {
    3
}
fn default_citation_chars() -> usize {
    350
}
fn default_preview_chars() -> usize {
    50
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            default_depth: default_depth(),
            default_breadth: default_breadth(),
            max_learnings: default_max_learnings(),
            source_pace_ms: 0,
            citation_chars: default_citation_chars(),
            preview_chars: default_preview_chars(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default `tracing` filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.delve/config.toml).
    ///
    /// Environment variables override the file:
    /// - `DELVE_API_KEY`, `OPENAI_API_KEY`, `OPENROUTER_API_KEY` (first set wins)
    /// - `EXA_API_KEY`
    /// - `DELVE_PROVIDER`, `DELVE_MODEL`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = lookup("DELVE_API_KEY")
                .or_else(|| lookup("OPENAI_API_KEY"))
                .or_else(|| lookup("OPENROUTER_API_KEY"));
        }

        if self.search.api_key.is_none() {
            self.search.api_key = lookup("EXA_API_KEY");
        }

        if let Some(provider) = lookup("DELVE_PROVIDER") {
            self.default_provider = provider;
        }

        if let Some(model) = lookup("DELVE_MODEL") {
            self.default_model = model;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".delve")
    }

    /// Path of the default config file.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(t) = self.default_temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(ConfigError::ValidationError(
                    "default_temperature must be between 0.0 and 2.0".into(),
                ));
            }
        }

        if !(1..=3).contains(&self.research.default_depth) {
            return Err(ConfigError::ValidationError(
                "research.default_depth must be between 1 and 3".into(),
            ));
        }

        if !(1..=5).contains(&self.research.default_breadth) {
            return Err(ConfigError::ValidationError(
                "research.default_breadth must be between 1 and 5".into(),
            ));
        }

        if self.research.max_learnings == 0 {
            return Err(ConfigError::ValidationError(
                "research.max_learnings must be > 0".into(),
            ));
        }

        if self.research.citation_chars == 0 || self.research.preview_chars == 0 {
            return Err(ConfigError::ValidationError(
                "research.citation_chars and research.preview_chars must be > 0".into(),
            ));
        }

        if !(1..=10).contains(&self.search.num_results) {
            return Err(ConfigError::ValidationError(
                "search.num_results must be between 1 and 10".into(),
            ));
        }

        Ok(())
    }

    /// Check if a generation API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some() || self.providers.values().any(|p| p.api_key.is_some())
    }

    /// Check if a search API key is available.
    pub fn has_search_key(&self) -> bool {
        self.search.api_key.is_some()
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            title_model: default_title_model(),
            default_temperature: None,
            default_max_tokens: None,
            provider_timeout_secs: default_provider_timeout(),
            providers: HashMap::new(),
            search: SearchConfig::default(),
            research: ResearchConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
