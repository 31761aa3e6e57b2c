use std::fmt;

/// Error types that can occur when interacting with LLM providers and tools.
#[derive(Debug)]
pub enum LLMError {
    /// HTTP request/response errors (transport failures)
    HttpError(String),
    /// Authentication and authorization errors
    AuthError(String),
    /// Invalid request parameters or format
    InvalidRequest(String),
    /// Errors returned by the LLM provider
    ProviderError(String),
    /// The provider answered with a payload we could not use
    ResponseFormatError {
        /// What went wrong
        message: String,
        /// Raw body returned by the provider
        raw_response: String,
    },
    /// JSON serialization/deserialization errors
    JsonError(String),
    /// A tool was misconfigured or called with bad arguments
    ToolConfigError(String),
    /// Anything else
    Generic(String),
}

impl fmt::Display for LLMError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LLMError::HttpError(e) => write!(f, "HTTP Error: {}", e),
            LLMError::AuthError(e) => write!(f, "Auth Error: {}", e),
            LLMError::InvalidRequest(e) => write!(f, "Invalid Request: {}", e),
            LLMError::ProviderError(e) => write!(f, "Provider Error: {}", e),
            LLMError::ResponseFormatError {
                message,
                raw_response,
            } => write!(f, "Response Format Error: {}. Raw response: {}", message, raw_response),
            LLMError::JsonError(e) => write!(f, "JSON Parse Error: {}", e),
            LLMError::ToolConfigError(e) => write!(f, "Tool Configuration Error: {}", e),
            LLMError::Generic(e) => write!(f, "Generic Error: {}", e),
        }
    }
}

impl std::error::Error for LLMError {}

impl LLMError {
    /// Whether the failure happened before the provider produced an answer
    /// (connection refused, DNS, timeout, ...).
    pub fn is_transport(&self) -> bool {
        matches!(self, LLMError::HttpError(_))
    }
}

/// Converts reqwest HTTP errors into LLMErrors
impl From<reqwest::Error> for LLMError {
    fn from(err: reqwest::Error) -> Self {
        LLMError::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for LLMError {
    fn from(err: serde_json::Error) -> Self {
        LLMError::JsonError(format!(
            "{} at line {} column {}",
            err,
            err.line(),
            err.column()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_variant() {
        let err = LLMError::AuthError("Missing Google API key".into());
        assert_eq!(err.to_string(), "Auth Error: Missing Google API key");

        let err = LLMError::ResponseFormatError {
            message: "bad status".into(),
            raw_response: "{}".into(),
        };
        assert!(err.to_string().contains("bad status"));
        assert!(err.to_string().contains("{}"));
    }

    #[test]
    fn json_errors_carry_position() {
        let err: LLMError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, LLMError::JsonError(ref m) if m.contains("line 1")));
        assert!(!err.is_transport());
    }
}
