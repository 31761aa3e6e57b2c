//! Groq API client implementation for chat functionality.
//!
//! Groq speaks the OpenAI chat-completions dialect, so this is a configuration of
//! [`OpenAICompatibleProvider`] with Groq's endpoint and default model.

use crate::{
    chat::Tool,
    providers::openai_compatible::{OpenAICompatibleConfig, OpenAICompatibleProvider},
    LLMProvider,
};

/// Groq configuration for the generic provider
pub struct GroqConfig;

impl OpenAICompatibleConfig for GroqConfig {
    const PROVIDER_NAME: &'static str = "Groq";
    const DEFAULT_BASE_URL: &'static str = "https://api.groq.com/openai/v1/";
    const DEFAULT_MODEL: &'static str = "llama-3.3-70b-versatile";
    const SUPPORTS_PARALLEL_TOOL_CALLS: bool = true;
}

pub type Groq = OpenAICompatibleProvider<GroqConfig>;

impl LLMProvider for Groq {
    fn tools(&self) -> Option<&[Tool]> {
        self.tools.as_deref()
    }
}
