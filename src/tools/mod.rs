//! Web search capability handed to the search agent.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LLMError;

mod duckduckgo;

pub use duckduckgo::DuckDuckGo;

/// A single search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Something that can look things up on the web.
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Returns at most `max_results` hits for `query`.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, LLMError>;
}
