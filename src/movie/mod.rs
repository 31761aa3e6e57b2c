//! Movie recommendation flow: render the analyst prompt, ask Gemini, return its markdown.

mod prompt;

use std::sync::Arc;

use crate::{
    chat::{ChatMessage, ChatProvider},
    error::LLMError,
    LLMProvider,
};

pub use prompt::{render_prompt, MovieQuery, RenderedPrompt, SIMILARITY_CRITERIA};

/// The only model the recommendation flow talks to.
pub const MOVIE_MODEL: &str = "gemini-2.0-flash";

/// Shown when the title or the year is missing.
pub const MISSING_FIELDS_ERROR: &str = "Please provide at least the movie name and release year";

/// Shown under every set of recommendations.
pub const PREFERENCES_TIP: &str =
    "Tip: The more specific your preferences, the better the recommendations!";

/// Sends rendered movie prompts to a single fixed model.
///
/// No retry, validation or timeout happens here: any provider failure is
/// returned to the caller as is.
pub struct MovieRecommender {
    llm: Arc<dyn LLMProvider>,
}

impl MovieRecommender {
    /// `llm` is expected to be configured for [`MOVIE_MODEL`].
    pub fn new(llm: Arc<dyn LLMProvider>) -> Self {
        Self { llm }
    }

    /// Renders the prompt for `query` and returns the model's markdown verbatim.
    pub async fn recommend(&self, query: &MovieQuery) -> Result<String, LLMError> {
        let prompt = render_prompt(query);
        self.invoke(&prompt).await
    }

    /// Sends an already rendered prompt.
    pub async fn invoke(&self, prompt: &RenderedPrompt) -> Result<String, LLMError> {
        let messages = [
            ChatMessage::system()
                .content(prompt.system_instruction())
                .build(),
            ChatMessage::user().content(prompt.user_message()).build(),
        ];

        log::debug!(
            "requesting movie recommendations from {}",
            self.llm.model_name()
        );
        let response = self.llm.chat(&messages).await?;
        if let Some(usage) = response.usage() {
            log::debug!("movie recommendation used {} tokens", usage.total_tokens);
        }

        response.text().ok_or_else(|| {
            LLMError::ProviderError("no text in recommendation response".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::chat::{ChatProvider, ChatResponse, ChatRole, Tool};
    use crate::ToolCall;

    #[derive(Debug)]
    struct TextResponse(Option<String>);

    impl std::fmt::Display for TextResponse {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.0.clone().unwrap_or_default())
        }
    }

    impl ChatResponse for TextResponse {
        fn text(&self) -> Option<String> {
            self.0.clone()
        }

        fn tool_calls(&self) -> Option<Vec<ToolCall>> {
            None
        }
    }

    struct RecordingProvider {
        reply: Result<Option<String>, ()>,
        seen: Mutex<Vec<ChatMessage>>,
    }

    #[async_trait]
    impl ChatProvider for RecordingProvider {
        async fn chat_with_tools(
            &self,
            messages: &[ChatMessage],
            _tools: Option<&[Tool]>,
        ) -> Result<Box<dyn ChatResponse>, LLMError> {
            self.seen.lock().unwrap().extend_from_slice(messages);
            match &self.reply {
                Ok(text) => Ok(Box::new(TextResponse(text.clone()))),
                Err(()) => Err(LLMError::HttpError("connection refused".into())),
            }
        }
    }

    impl LLMProvider for RecordingProvider {}

    fn recommender(reply: Result<Option<String>, ()>) -> (MovieRecommender, Arc<RecordingProvider>) {
        let provider = Arc::new(RecordingProvider {
            reply,
            seen: Mutex::new(Vec::new()),
        });
        (MovieRecommender::new(provider.clone()), provider)
    }

    #[tokio::test]
    async fn sends_system_instruction_and_user_message() {
        let (recommender, provider) = recommender(Ok(Some("**Interstellar** (2014)".into())));
        let query = MovieQuery::new("Inception", "2010");

        let text = recommender.recommend(&query).await.unwrap();
        assert_eq!(text, "**Interstellar** (2014)");

        let seen = provider.seen.lock().unwrap();
        let expected = render_prompt(&query);
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].role, ChatRole::System);
        assert_eq!(seen[0].content, expected.system_instruction());
        assert_eq!(seen[1].role, ChatRole::User);
        assert_eq!(seen[1].content, expected.user_message());
    }

    #[tokio::test]
    async fn text_is_returned_without_trimming() {
        let (recommender, _) = recommender(Ok(Some("  spaced  \n".into())));
        let text = recommender
            .recommend(&MovieQuery::new("Heat", "1995"))
            .await
            .unwrap();
        assert_eq!(text, "  spaced  \n");
    }

    #[tokio::test]
    async fn provider_errors_propagate() {
        let (recommender, _) = recommender(Err(()));
        let err = recommender
            .recommend(&MovieQuery::new("Heat", "1995"))
            .await
            .unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn missing_text_is_a_provider_error() {
        let (recommender, _) = recommender(Ok(None));
        let err = recommender
            .recommend(&MovieQuery::new("Heat", "1995"))
            .await
            .unwrap_err();
        assert!(matches!(err, LLMError::ProviderError(_)));
    }
}
