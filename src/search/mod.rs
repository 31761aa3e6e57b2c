//! Search flow: rewrite the query into a search description, then let a
//! web-search agent answer the original query.

mod description;
mod pipeline;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LLMError;

pub use description::{describe, render_description_prompt, Description};
pub use pipeline::{SearchOutcome, SearchPipeline, SearchReport, SearchStage};

/// Shown when the query box is empty.
pub const EMPTY_QUERY_WARNING: &str = "Please enter a search query";
/// Shown when the agent answered with nothing.
pub const NO_RESULTS_NOTICE: &str = "No results found. Try rephrasing your query.";
/// Shown when the agent failed.
pub const AGENT_ERROR_NOTICE: &str = "The search agent failed. Please try again later.";

/// The models offered in the search model dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SearchModel {
    #[default]
    #[serde(rename = "llama-3.3-70b-versatile")]
    Llama33Versatile,
    #[serde(rename = "llama-3.1-8b-instant")]
    Llama31Instant,
    #[serde(rename = "gemma2-9b-it")]
    Gemma2,
    #[serde(rename = "mixtral-8x7b-32768")]
    Mixtral,
}

impl SearchModel {
    /// Every choice, in dropdown order.
    pub const ALL: [SearchModel; 4] = [
        SearchModel::Llama33Versatile,
        SearchModel::Llama31Instant,
        SearchModel::Gemma2,
        SearchModel::Mixtral,
    ];

    /// Provider model identifier.
    pub fn id(self) -> &'static str {
        match self {
            SearchModel::Llama33Versatile => "llama-3.3-70b-versatile",
            SearchModel::Llama31Instant => "llama-3.1-8b-instant",
            SearchModel::Gemma2 => "gemma2-9b-it",
            SearchModel::Mixtral => "mixtral-8x7b-32768",
        }
    }

    /// Human readable name for the dropdown.
    pub fn label(self) -> &'static str {
        match self {
            SearchModel::Llama33Versatile => "Llama 3.3 70B Versatile",
            SearchModel::Llama31Instant => "Llama 3.1 8B Instant",
            SearchModel::Gemma2 => "Gemma 2 9B",
            SearchModel::Mixtral => "Mixtral 8x7B",
        }
    }
}

impl FromStr for SearchModel {
    type Err = LLMError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        SearchModel::ALL
            .into_iter()
            .find(|m| m.id() == s)
            .ok_or_else(|| LLMError::InvalidRequest(format!("Unknown search model: {s}")))
    }
}

impl fmt::Display for SearchModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_identifier() {
        for model in SearchModel::ALL {
            assert_eq!(model.id().parse::<SearchModel>().unwrap(), model);
        }
    }

    #[test]
    fn rejects_unknown_identifiers() {
        let err = "gpt-4".parse::<SearchModel>().unwrap_err();
        assert!(err.to_string().contains("Unknown search model"));
    }

    #[test]
    fn serde_uses_identifiers() {
        let json = serde_json::to_string(&SearchModel::Gemma2).unwrap();
        assert_eq!(json, "\"gemma2-9b-it\"");
        let model: SearchModel = serde_json::from_str("\"mixtral-8x7b-32768\"").unwrap();
        assert_eq!(model, SearchModel::Mixtral);
        assert_eq!(SearchModel::default().id(), "llama-3.3-70b-versatile");
    }
}
