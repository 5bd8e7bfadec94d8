//! Error types for the Delve domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; the research taxonomy has
//! one variant per external call type.

use thiserror::Error;

/// The top-level error type for all Delve operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Search errors ---
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    // --- Research errors ---
    #[error("Research error: {0}")]
    Research(#[from] ResearchError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Errors raised by a web search backend.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    #[error("Search API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Search rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Search authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Search provider not configured: {0}")]
    NotConfigured(String),

    #[error("Search timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid search response: {0}")]
    InvalidResponse(String),
}

/// Failure of a schema-constrained generation call.
///
/// Either the provider call itself failed, or it returned something that
/// does not decode into (or validate as) the requested shape.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Output failed schema validation: {0}")]
    Schema(String),
}

/// The research taxonomy: one variant per external call type.
#[derive(Debug, Error)]
pub enum ResearchError {
    #[error("Query planning failed: {0}")]
    Planning(#[source] GenerationError),

    #[error("Search failed for \"{query}\": {source}")]
    Search { query: String, source: SearchError },

    #[error("Learning extraction failed for \"{query}\": {source}")]
    Extraction {
        query: String,
        source: GenerationError,
    },

    #[error("Report synthesis failed: {0}")]
    Synthesis(#[source] GenerationError),

    #[error("Invalid research input: {0}")]
    InvalidInput(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name} — {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}
