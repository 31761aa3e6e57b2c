//! Builder module for configuring and instantiating LLM providers.
//!
//! This module provides a builder pattern for creating provider instances, plus
//! helpers for describing function tools the model may call.

use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    chat::{FunctionTool, ParameterProperty, ParametersSchema, Tool},
    error::LLMError,
    LLMProvider,
};

/// Supported LLM backend providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LLMBackend {
    /// Google Gemini API provider
    Google,
    /// Groq API provider
    Groq,
}

/// Parses a backend name, case-insensitively.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use llm_companion::builder::LLMBackend;
///
/// let backend = LLMBackend::from_str("Groq").unwrap();
/// assert_eq!(backend, LLMBackend::Groq);
///
/// let err = LLMBackend::from_str("invalid").unwrap_err();
/// assert!(err.to_string().contains("Unknown LLM backend"));
/// ```
impl std::str::FromStr for LLMBackend {
    type Err = LLMError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "google" | "gemini" => Ok(LLMBackend::Google),
            "groq" => Ok(LLMBackend::Groq),
            _ => Err(LLMError::InvalidRequest(format!(
                "Unknown LLM backend: {}",
                s
            ))),
        }
    }
}

/// Builder for configuring and instantiating LLM providers.
#[derive(Default)]
pub struct LLMBuilder {
    /// Selected backend provider
    backend: Option<LLMBackend>,
    /// API key for authentication with the provider
    api_key: Option<String>,
    /// Base URL for API requests
    base_url: Option<String>,
    /// Model identifier/name to use
    model: Option<String>,
    /// Maximum tokens to generate in responses
    max_tokens: Option<u32>,
    /// Request timeout duration in seconds
    timeout_seconds: Option<u64>,
    /// Function tools
    tools: Option<Vec<Tool>>,
}

impl LLMBuilder {
    /// Creates a new empty builder instance with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the backend provider to use.
    pub fn backend(mut self, backend: LLMBackend) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Sets the API key for authentication.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL for API requests.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the model identifier to use.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the maximum number of tokens to generate.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Sets the request timeout in seconds.
    pub fn timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = Some(timeout_seconds);
        self
    }

    /// Adds a function tool to the builder
    pub fn function(mut self, function_builder: FunctionBuilder) -> Self {
        self.tools
            .get_or_insert_with(Vec::new)
            .push(function_builder.build());
        self
    }

    /// Builds and returns a configured LLM provider instance.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No backend is specified
    /// - Required backend feature is not enabled
    /// - No API key was provided (an empty key is accepted and fails on first call)
    pub fn build(self) -> Result<Box<dyn LLMProvider>, LLMError> {
        let backend = self
            .backend
            .ok_or_else(|| LLMError::InvalidRequest("No backend specified".to_string()))?;

        #[allow(unused_variables)]
        let provider: Box<dyn LLMProvider> = match backend {
            LLMBackend::Google => {
                #[cfg(not(feature = "google"))]
                return Err(LLMError::InvalidRequest(
                    "Google feature not enabled".to_string(),
                ));

                #[cfg(feature = "google")]
                {
                    let api_key = self.api_key.ok_or_else(|| {
                        LLMError::InvalidRequest("No API key provided for Google".to_string())
                    })?;
                    if self.tools.is_some() {
                        return Err(LLMError::ToolConfigError(
                            "Google backend does not support function tools".to_string(),
                        ));
                    }

                    Box::new(crate::backends::google::Google::new(
                        api_key,
                        self.base_url,
                        self.model,
                        self.max_tokens,
                        self.timeout_seconds,
                    )?)
                }
            }
            LLMBackend::Groq => {
                #[cfg(not(feature = "groq"))]
                return Err(LLMError::InvalidRequest(
                    "Groq feature not enabled".to_string(),
                ));

                #[cfg(feature = "groq")]
                {
                    let api_key = self.api_key.ok_or_else(|| {
                        LLMError::InvalidRequest("No API key provided for Groq".to_string())
                    })?;

                    Box::new(crate::backends::groq::Groq::new(
                        api_key,
                        self.base_url,
                        self.model,
                        self.max_tokens,
                        self.timeout_seconds,
                        self.tools,
                    )?)
                }
            }
        };

        #[allow(unreachable_code)]
        Ok(provider)
    }

    /// Builds the provider behind an `Arc`, ready to be shared between handlers.
    pub fn build_shared(self) -> Result<Arc<dyn LLMProvider>, LLMError> {
        self.build().map(Arc::from)
    }
}

/// Builder for function parameters
pub struct ParamBuilder {
    name: String,
    property_type: String,
    description: String,
}

impl ParamBuilder {
    /// Creates a new parameter builder
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            property_type: "string".to_string(),
            description: String::new(),
        }
    }

    /// Sets the parameter type
    pub fn type_of(mut self, type_str: impl Into<String>) -> Self {
        self.property_type = type_str.into();
        self
    }

    /// Sets the parameter description
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    fn build(self) -> (String, ParameterProperty) {
        (
            self.name,
            ParameterProperty {
                property_type: self.property_type,
                description: self.description,
            },
        )
    }
}

/// Builder for function tools
pub struct FunctionBuilder {
    name: String,
    description: String,
    parameters: Vec<ParamBuilder>,
    required: Vec<String>,
}

impl FunctionBuilder {
    /// Creates a new function builder
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            parameters: Vec::new(),
            required: Vec::new(),
        }
    }

    /// Sets the function description
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Adds a parameter to the function
    pub fn param(mut self, param: ParamBuilder) -> Self {
        self.parameters.push(param);
        self
    }

    /// Marks parameters as required
    pub fn required(mut self, param_names: Vec<String>) -> Self {
        self.required = param_names;
        self
    }

    /// Builds the function tool
    pub fn build(self) -> Tool {
        let properties: HashMap<String, ParameterProperty> =
            self.parameters.into_iter().map(ParamBuilder::build).collect();

        let schema = ParametersSchema {
            schema_type: "object".to_string(),
            properties,
            required: self.required,
        };

        Tool {
            tool_type: "function".to_string(),
            function: FunctionTool {
                name: self.name,
                description: self.description,
                parameters: serde_json::to_value(schema).unwrap_or_default(),
            },
        }
    }
}
