//! # Delve Core
//!
//! Domain types, traits, and error definitions for the Delve research
//! orchestrator. This crate pulls in no HTTP client. Tokio is used only for
//! the progress channel. It defines the domain model that all other crates
//! implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is defined as a trait here. Implementations
//! live in their respective crates. This enables:
//! - Swapping the generation or search backend via configuration
//! - Testing the research traversal with scripted stubs
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod message;
pub mod progress;
pub mod provider;
pub mod research;
pub mod search;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, GenerationError, ResearchError, Result};
pub use message::{Message, Role};
pub use progress::{ProgressEvent, ProgressReporter};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ResponseFormat};
pub use research::{DeepResearchOutput, Query, Research, ResearchReport, Source};
pub use search::{SearchOptions, SearchProvider};
pub use tool::{Tool, ToolCall, ToolDefinition, ToolRegistry, ToolResult};
