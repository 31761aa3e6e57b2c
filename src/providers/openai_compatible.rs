//! OpenAI-compatible API client base implementation
//!
//! This module provides a generic base for OpenAI-compatible chat-completions APIs.
//! Providers plug in through [`OpenAICompatibleConfig`]; Groq is the one this crate ships.

use std::marker::PhantomData;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::chat::{ChatMessage, ChatProvider, ChatResponse, ChatRole, MessageType, Tool, Usage};
use crate::error::LLMError;
use crate::ToolCall;

/// Generic OpenAI-compatible provider
///
/// Different providers customize behavior by implementing [`OpenAICompatibleConfig`].
pub struct OpenAICompatibleProvider<T: OpenAICompatibleConfig> {
    pub api_key: String,
    pub base_url: Url,
    pub model: String,
    pub max_tokens: Option<u32>,
    pub timeout_seconds: Option<u64>,
    pub tools: Option<Vec<Tool>>,
    pub client: Client,
    _phantom: PhantomData<T>,
}

/// Configuration trait for OpenAI-compatible providers
pub trait OpenAICompatibleConfig: Send + Sync {
    /// The name of the provider (e.g., "Groq")
    const PROVIDER_NAME: &'static str;

    /// Default base URL for the provider
    const DEFAULT_BASE_URL: &'static str;

    /// Default model for the provider
    const DEFAULT_MODEL: &'static str;

    /// Chat completions endpoint path (usually "chat/completions")
    const CHAT_ENDPOINT: &'static str = "chat/completions";

    /// Whether this provider accepts `parallel_tool_calls`
    const SUPPORTS_PARALLEL_TOOL_CALLS: bool = false;
}

/// Generic OpenAI-compatible chat message
#[derive(Serialize, Debug)]
pub struct OpenAICompatibleChatMessage<'a> {
    pub role: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<OpenAICompatibleFunctionCall<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<&'a str>,
}

#[derive(Serialize, Debug)]
pub struct OpenAICompatibleFunctionPayload<'a> {
    pub name: &'a str,
    pub arguments: &'a str,
}

#[derive(Serialize, Debug)]
pub struct OpenAICompatibleFunctionCall<'a> {
    pub id: &'a str,
    #[serde(rename = "type")]
    pub content_type: &'a str,
    pub function: OpenAICompatibleFunctionPayload<'a>,
}

/// Generic OpenAI-compatible chat request
#[derive(Serialize, Debug)]
pub struct OpenAICompatibleChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<OpenAICompatibleChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<&'a [Tool]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel_tool_calls: Option<bool>,
}

/// Generic OpenAI-compatible chat response
#[derive(Deserialize, Debug)]
pub struct OpenAICompatibleChatResponse {
    pub choices: Vec<OpenAICompatibleChatChoice>,
    pub usage: Option<Usage>,
}

#[derive(Deserialize, Debug)]
pub struct OpenAICompatibleChatChoice {
    pub message: OpenAICompatibleChatMsg,
}

#[derive(Deserialize, Debug)]
pub struct OpenAICompatibleChatMsg {
    pub role: String,
    pub content: Option<String>,
    pub tool_calls: Option<Vec<ToolCall>>,
}

impl ChatResponse for OpenAICompatibleChatResponse {
    fn text(&self) -> Option<String> {
        self.choices.first().and_then(|c| c.message.content.clone())
    }

    fn tool_calls(&self) -> Option<Vec<ToolCall>> {
        self.choices
            .first()
            .and_then(|c| c.message.tool_calls.clone())
            .filter(|calls| !calls.is_empty())
    }

    fn usage(&self) -> Option<Usage> {
        self.usage.clone()
    }
}

impl std::fmt::Display for OpenAICompatibleChatResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Some(choice) = self.choices.first() else {
            return Ok(());
        };
        if let Some(tool_calls) = &choice.message.tool_calls {
            for tool_call in tool_calls {
                write!(f, "{tool_call}")?;
            }
        }
        if let Some(content) = &choice.message.content {
            write!(f, "{content}")?;
        }
        Ok(())
    }
}

impl<T: OpenAICompatibleConfig> OpenAICompatibleProvider<T> {
    /// Creates a new client; `base_url` and `model` fall back to the provider defaults.
    pub fn new(
        api_key: impl Into<String>,
        base_url: Option<String>,
        model: Option<String>,
        max_tokens: Option<u32>,
        timeout_seconds: Option<u64>,
        tools: Option<Vec<Tool>>,
    ) -> Result<Self, LLMError> {
        let mut builder = Client::builder();
        if let Some(sec) = timeout_seconds {
            builder = builder.timeout(std::time::Duration::from_secs(sec));
        }

        let mut base = base_url.unwrap_or_else(|| T::DEFAULT_BASE_URL.to_owned());
        // Url::join drops the last path segment without a trailing slash
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).map_err(|e| {
            LLMError::InvalidRequest(format!("Invalid {} base URL '{base}': {e}", T::PROVIDER_NAME))
        })?;

        Ok(Self {
            api_key: api_key.into(),
            base_url,
            model: model.unwrap_or_else(|| T::DEFAULT_MODEL.to_string()),
            max_tokens,
            timeout_seconds,
            tools,
            client: builder.build()?,
            _phantom: PhantomData,
        })
    }

    /// Builds the wire messages; tool results expand to one `tool` message each.
    fn api_messages<'a>(&self, messages: &'a [ChatMessage]) -> Vec<OpenAICompatibleChatMessage<'a>> {
        let mut api_msgs = Vec::with_capacity(messages.len());

        for msg in messages {
            match &msg.message_type {
                MessageType::ToolResult(results) => {
                    for result in results {
                        api_msgs.push(OpenAICompatibleChatMessage {
                            role: "tool",
                            content: Some(&result.function.arguments),
                            tool_calls: None,
                            tool_call_id: Some(&result.id),
                        });
                    }
                }
                _ => api_msgs.push(chat_message_to_api_message(msg)),
            }
        }
        api_msgs
    }
}

/// Converts a [`ChatMessage`] into its wire form, borrowing from it.
pub fn chat_message_to_api_message(chat_msg: &ChatMessage) -> OpenAICompatibleChatMessage<'_> {
    OpenAICompatibleChatMessage {
        role: match chat_msg.role {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        },
        content: match &chat_msg.message_type {
            MessageType::ToolUse(_) if chat_msg.content.is_empty() => None,
            _ => Some(&chat_msg.content),
        },
        tool_calls: match &chat_msg.message_type {
            MessageType::ToolUse(calls) => Some(
                calls
                    .iter()
                    .map(|c| OpenAICompatibleFunctionCall {
                        id: &c.id,
                        content_type: "function",
                        function: OpenAICompatibleFunctionPayload {
                            name: &c.function.name,
                            arguments: &c.function.arguments,
                        },
                    })
                    .collect(),
            ),
            _ => None,
        },
        tool_call_id: None,
    }
}

#[async_trait]
impl<T: OpenAICompatibleConfig> ChatProvider for OpenAICompatibleProvider<T> {
    async fn chat_with_tools(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[Tool]>,
    ) -> Result<Box<dyn ChatResponse>, LLMError> {
        if self.api_key.is_empty() {
            return Err(LLMError::AuthError(format!("Missing {} API key", T::PROVIDER_NAME)));
        }

        let request_tools = tools.or(self.tools.as_deref());
        let body = OpenAICompatibleChatRequest {
            model: &self.model,
            messages: self.api_messages(messages),
            max_tokens: self.max_tokens,
            stream: false,
            tools: request_tools,
            parallel_tool_calls: if T::SUPPORTS_PARALLEL_TOOL_CALLS && request_tools.is_some() {
                Some(false)
            } else {
                None
            },
        };

        let url = self
            .base_url
            .join(T::CHAT_ENDPOINT)
            .map_err(|e| LLMError::HttpError(e.to_string()))?;

        if log::log_enabled!(log::Level::Trace) {
            if let Ok(json) = serde_json::to_string(&body) {
                log::trace!("{} request payload: {}", T::PROVIDER_NAME, json);
            }
        }

        let mut request = self.client.post(url).bearer_auth(&self.api_key).json(&body);
        if let Some(timeout) = self.timeout_seconds {
            request = request.timeout(std::time::Duration::from_secs(timeout));
        }

        let response = request.send().await?;
        log::debug!("{} HTTP status: {}", T::PROVIDER_NAME, response.status());

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(LLMError::ResponseFormatError {
                message: format!("{} API returned error status: {status}", T::PROVIDER_NAME),
                raw_response: error_text,
            });
        }

        let resp_text = response.text().await?;
        match serde_json::from_str::<OpenAICompatibleChatResponse>(&resp_text) {
            Ok(response) => Ok(Box::new(response)),
            Err(e) => Err(LLMError::ResponseFormatError {
                message: format!("Failed to decode {} API response: {e}", T::PROVIDER_NAME),
                raw_response: resp_text,
            }),
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
