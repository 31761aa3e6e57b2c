//! LLM Companion: two small front ends over hosted large-language-model providers.
//!
//! # Overview
//! - **Movie recommendations**: a title, a year and optional preferences are rendered into
//!   a system instruction and sent to Google Gemini; the markdown reply is shown as is.
//! - **Web search**: a query is first rewritten into a search description (falling back to
//!   the raw query when that fails), then a tool-calling agent with a web-search tool
//!   answers the original query.
//!
//! # Architecture
//! Provider clients are built once from [`config::AppConfig`] and injected into the
//! [`movie::MovieRecommender`] and [`search::SearchPipeline`] handlers. The
//! [`api`] module exposes both flows as browser pages and JSON endpoints.

// Re-export for convenience
pub use async_trait::async_trait;

use serde::{Deserialize, Serialize};

/// Backend implementations for the supported providers (Google, Groq)
pub mod backends;

/// Builder pattern for configuring and instantiating LLM providers
pub mod builder;

/// Chat-based interactions with language models
pub mod chat;

/// Error types and handling
pub mod error;

/// Shared client implementations reused by several backends
pub mod providers;

/// Prebuilt provider clients keyed by search model
pub mod registry;

/// Process-wide configuration read from the environment
pub mod config;

/// Movie recommendation flow
pub mod movie;

/// Search-description and agent flow
pub mod search;

/// Web search capability used by the agent
pub mod tools;

/// Tool-calling agent
pub mod agent;

#[cfg(feature = "api")]
pub mod api;

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
/// This is a no-op if the feature is not enabled.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::try_init();
    }
}

/// Core trait that all LLM providers implement.
pub trait LLMProvider: chat::ChatProvider {
    fn tools(&self) -> Option<&[chat::Tool]> {
        None
    }
}

/// Tool call represents a function call that an LLM wants to make.
/// This is a standardized structure used across all providers.
#[derive(Debug, Deserialize, Serialize, Clone, Eq, PartialEq)]
pub struct ToolCall {
    /// The ID of the tool call.
    pub id: String,
    /// The type of the tool call (usually "function").
    #[serde(rename = "type")]
    pub call_type: String,
    /// The function to call.
    pub function: FunctionCall,
}

/// FunctionCall contains details about which function to call and with what arguments.
#[derive(Debug, Deserialize, Serialize, Clone, Eq, PartialEq)]
pub struct FunctionCall {
    /// The name of the function to call.
    pub name: String,
    /// The arguments to pass to the function, typically serialized as a JSON string.
    pub arguments: String,
}

impl std::fmt::Display for ToolCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.function.name, self.function.arguments)
    }
}
