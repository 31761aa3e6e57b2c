use crate::{
    chat::{ChatMessage, ChatProvider},
    LLMProvider,
};

/// Builds the instruction asking a model to turn `query` into a search description.
pub fn render_description_prompt(query: &str) -> String {
    format!(
        "You are a search assistant. Rewrite the following user query into a concise, \
search-oriented description of what the user is looking for, in no more than 5-6 sentences. \
Preserve the original intent and any specific names, places or constraints. \
Return only the description, without any commentary or preamble.

User query: {query}"
    )
}

/// Outcome of the description stage.
///
/// The stage never fails: when the model cannot produce a description the
/// original query stands in for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Description {
    /// Trimmed text produced by the model
    Generated(String),
    /// The unmodified user query
    Fallback(String),
}

impl Description {
    pub fn text(&self) -> &str {
        match self {
            Description::Generated(text) | Description::Fallback(text) => text,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Description::Fallback(_))
    }

    pub fn into_text(self) -> String {
        match self {
            Description::Generated(text) | Description::Fallback(text) => text,
        }
    }
}

/// Asks `llm` for a search description of `query`.
pub async fn describe(llm: &dyn LLMProvider, query: &str) -> Description {
    let messages = [ChatMessage::user()
        .content(render_description_prompt(query))
        .build()];

    match llm.chat(&messages).await {
        Ok(response) => match response.text() {
            Some(text) => Description::Generated(text.trim().to_string()),
            None => {
                log::warn!("description response had no text, falling back to the query");
                Description::Fallback(query.to_string())
            }
        },
        Err(e) => {
            log::warn!("description generation failed, falling back to the query: {e}");
            Description::Fallback(query.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::chat::{ChatProvider, ChatResponse, Tool};
    use crate::error::LLMError;

    #[derive(Debug)]
    struct Reply(Option<String>);

    impl std::fmt::Display for Reply {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self.0)
        }
    }

    impl ChatResponse for Reply {
        fn text(&self) -> Option<String> {
            self.0.clone()
        }

        fn tool_calls(&self) -> Option<Vec<crate::ToolCall>> {
            None
        }
    }

    enum Stub {
        Text(Option<&'static str>),
        Fail,
    }

    #[async_trait]
    impl ChatProvider for Stub {
        async fn chat_with_tools(
            &self,
            messages: &[ChatMessage],
            _tools: Option<&[Tool]>,
        ) -> Result<Box<dyn ChatResponse>, LLMError> {
            assert!(messages[0].content.contains("User query:"));
            match self {
                Stub::Text(text) => Ok(Box::new(Reply(text.map(str::to_string)))),
                Stub::Fail => Err(LLMError::HttpError("connection reset".into())),
            }
        }
    }

    impl LLMProvider for Stub {}

    #[test]
    fn prompt_carries_the_query() {
        let prompt = render_description_prompt("best pizza in Rome");
        assert!(prompt.ends_with("User query: best pizza in Rome"));
        assert!(prompt.contains("5-6 sentences"));
    }

    #[tokio::test]
    async fn success_is_trimmed() {
        let description = describe(&Stub::Text(Some("  Pizzerias in Rome.\n")), "pizza").await;
        assert_eq!(description, Description::Generated("Pizzerias in Rome.".into()));
    }

    #[tokio::test]
    async fn failure_falls_back_to_the_query() {
        let description = describe(&Stub::Fail, "best pizza in Rome").await;
        assert!(description.is_fallback());
        assert_eq!(description.text(), "best pizza in Rome");
    }

    #[tokio::test]
    async fn missing_text_falls_back_to_the_query() {
        assert_eq!(
            describe(&Stub::Text(None), "q").await,
            Description::Fallback("q".into())
        );
    }

    #[tokio::test]
    async fn blank_success_is_generated_empty() {
        let description = describe(&Stub::Text(Some("   \n")), "best pizza in Rome").await;
        assert_eq!(description, Description::Generated(String::new()));
        assert_eq!(description.into_text(), "");
    }
}
