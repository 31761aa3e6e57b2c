//! Google Gemini API client implementation for chat functionality.
//!
//! This module provides integration with Google's Gemini models through the
//! `generateContent` endpoint.
//!
//! # Features
//! - System instructions on Gemini's dedicated `systemInstruction` channel
//! - Conversation history (user / model turns)
//! - An optional output token limit
//!
//! # Example
//! ```no_run
//! use llm_companion::backends::google::Google;
//! use llm_companion::chat::{ChatMessage, ChatProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Google::new(
//!         std::env::var("GOOGLE_API_KEY")?,
//!         None,                                 // default base URL
//!         Some("gemini-2.0-flash".to_string()), // model
//!         None,                                 // max tokens
//!         None,                                 // no timeout
//!     )?;
//!
//!     let messages = vec![
//!         ChatMessage::system().content("You are a film critic.").build(),
//!         ChatMessage::user().content("Is Inception worth watching?").build(),
//!     ];
//!     let response = client.chat(&messages).await?;
//!     println!("{}", response);
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
    chat::{split_system, ChatMessage, ChatProvider, ChatResponse, ChatRole, Tool, Usage},
    error::LLMError,
    LLMProvider, ToolCall,
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Client for interacting with Google's Gemini API.
pub struct Google {
    /// API key for authentication with Google's API
    pub api_key: String,
    /// Base URL of the Generative Language API
    pub base_url: String,
    /// Model identifier (e.g. "gemini-2.0-flash")
    pub model: String,
    /// Maximum number of tokens to generate in responses
    pub max_tokens: Option<u32>,
    /// Request timeout in seconds
    pub timeout_seconds: Option<u64>,
    client: Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GoogleChatRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GoogleSystemInstruction>,
    contents: Vec<GoogleChatContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GoogleGenerationConfig>,
}

#[derive(Serialize)]
struct GoogleSystemInstruction {
    parts: Vec<GoogleOwnedPart>,
}

#[derive(Serialize)]
struct GoogleOwnedPart {
    text: String,
}

/// Individual message in a chat conversation
#[derive(Serialize)]
struct GoogleChatContent<'a> {
    /// "user" or "model"
    role: &'a str,
    parts: Vec<GoogleContentPart<'a>>,
}

#[derive(Serialize)]
struct GoogleContentPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GoogleGenerationConfig {
    max_output_tokens: u32,
}

/// Response from the generateContent API
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GoogleChatResponse {
    /// Absent when the prompt itself was blocked
    #[serde(default)]
    candidates: Vec<GoogleCandidate>,
    usage_metadata: Option<GoogleUsageMetadata>,
}

#[derive(Deserialize, Debug)]
struct GoogleCandidate {
    content: Option<GoogleResponseContent>,
}

#[derive(Deserialize, Debug)]
struct GoogleResponseContent {
    #[serde(default)]
    parts: Vec<GoogleResponsePart>,
}

#[derive(Deserialize, Debug)]
struct GoogleResponsePart {
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GoogleUsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

impl ChatResponse for GoogleChatResponse {
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let texts: Vec<&str> = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        }
    }

    fn tool_calls(&self) -> Option<Vec<ToolCall>> {
        None
    }

    fn usage(&self) -> Option<Usage> {
        self.usage_metadata.as_ref().map(|u| Usage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        })
    }
}

impl std::fmt::Display for GoogleChatResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text().unwrap_or_default())
    }
}

fn system_instruction(text: String) -> GoogleSystemInstruction {
    GoogleSystemInstruction {
        parts: vec![GoogleOwnedPart { text }],
    }
}

impl Google {
    /// Creates a new Google Gemini client with the specified configuration.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Google API key for authentication
    /// * `base_url` - API root (defaults to the public v1beta endpoint)
    /// * `model` - Model identifier (defaults to "gemini-2.0-flash")
    /// * `max_tokens` - Maximum tokens in response
    /// * `timeout_seconds` - Request timeout in seconds
    pub fn new(
        api_key: impl Into<String>,
        base_url: Option<String>,
        model: Option<String>,
        max_tokens: Option<u32>,
        timeout_seconds: Option<u64>,
    ) -> Result<Self, LLMError> {
        let mut builder = Client::builder();
        if let Some(sec) = timeout_seconds {
            builder = builder.timeout(std::time::Duration::from_secs(sec));
        }
        let mut base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Ok(Self {
            api_key: api_key.into(),
            base_url,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens,
            timeout_seconds,
            client: builder.build()?,
        })
    }

    // An empty generationConfig object is rejected by the API
    fn generation_config(&self) -> Option<GoogleGenerationConfig> {
        self.max_tokens.map(|max_output_tokens| GoogleGenerationConfig { max_output_tokens })
    }
}

#[async_trait]
impl ChatProvider for Google {
    /// Sends a chat request to Google's Gemini API.
    ///
    /// Leading system messages become the `systemInstruction`; the remaining
    /// messages are sent as `user` / `model` turns.
    async fn chat_with_tools(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[Tool]>,
    ) -> Result<Box<dyn ChatResponse>, LLMError> {
        if self.api_key.is_empty() {
            return Err(LLMError::AuthError("Missing Google API key".to_string()));
        }
        if tools.is_some_and(|t| !t.is_empty()) {
            return Err(LLMError::ToolConfigError(
                "Tool calling is not supported by the Google backend".to_string(),
            ));
        }

        let (request_system, rest) = split_system(messages);
        let contents = rest
            .iter()
            .map(|msg| GoogleChatContent {
                role: match msg.role {
                    ChatRole::Assistant => "model",
                    ChatRole::User | ChatRole::System => "user",
                },
                parts: vec![GoogleContentPart { text: &msg.content }],
            })
            .collect();

        let req_body = GoogleChatRequest {
            system_instruction: request_system.map(system_instruction),
            contents,
            generation_config: self.generation_config(),
        };

        if log::log_enabled!(log::Level::Trace) {
            if let Ok(json) = serde_json::to_string(&req_body) {
                log::trace!("Google request payload: {}", json);
            }
        }

        let url = format!(
            "{base}models/{model}:generateContent",
            base = self.base_url,
            model = self.model
        );

        let mut request = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&req_body);
        if let Some(timeout) = self.timeout_seconds {
            request = request.timeout(std::time::Duration::from_secs(timeout));
        }

        let response = request.send().await?;
        log::debug!("Google HTTP status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(LLMError::ResponseFormatError {
                message: format!("Google API returned error status: {status}"),
                raw_response: error_text,
            });
        }

        let resp_text = response.text().await?;
        let json_resp: GoogleChatResponse =
            serde_json::from_str(&resp_text).map_err(|e| LLMError::ResponseFormatError {
                message: format!("Failed to decode Google API response: {e}"),
                raw_response: resp_text.clone(),
            })?;

        if json_resp.candidates.is_empty() {
            return Err(LLMError::ProviderError(
                "No candidates returned by Google".to_string(),
            ));
        }

        Ok(Box::new(json_resp))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

impl LLMProvider for Google {}
