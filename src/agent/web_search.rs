use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use super::AgentTool;
use crate::{
    builder::{FunctionBuilder, ParamBuilder},
    chat::Tool,
    error::LLMError,
    tools::WebSearch,
};

pub const WEB_SEARCH_TOOL: &str = "web_search";

/// Exposes a [`WebSearch`] backend to the model as the `web_search` function.
pub struct WebSearchTool {
    search: Arc<dyn WebSearch>,
    max_results: usize,
}

#[derive(Deserialize)]
struct WebSearchArgs {
    query: String,
    max_results: Option<usize>,
}

impl WebSearchTool {
    /// `max_results` caps what the model may request.
    pub fn new(search: Arc<dyn WebSearch>, max_results: usize) -> Self {
        Self {
            search,
            max_results: max_results.max(1),
        }
    }
}

#[async_trait]
impl AgentTool for WebSearchTool {
    fn definition(&self) -> Tool {
        FunctionBuilder::new(WEB_SEARCH_TOOL)
            .description(
                "Search the web for up-to-date information. \
                 Returns a JSON list of results with title, url and snippet.",
            )
            .param(
                ParamBuilder::new("query")
                    .type_of("string")
                    .description("The search query"),
            )
            .param(
                ParamBuilder::new("max_results")
                    .type_of("integer")
                    .description("Maximum number of results to return"),
            )
            .required(vec!["query".to_string()])
            .build()
    }

    async fn call(&self, arguments: &str) -> Result<String, LLMError> {
        let args: WebSearchArgs = serde_json::from_str(arguments).map_err(|e| {
            LLMError::ToolConfigError(format!("Invalid {WEB_SEARCH_TOOL} arguments: {e}"))
        })?;
        let limit = args
            .max_results
            .unwrap_or(self.max_results)
            .clamp(1, self.max_results);

        let hits = self.search.search(&args.query, limit).await?;
        Ok(serde_json::to_string(&hits)?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::tools::SearchHit;

    #[derive(Default)]
    struct FakeSearch {
        calls: Mutex<Vec<(String, usize)>>,
    }

    #[async_trait]
    impl WebSearch for FakeSearch {
        async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, LLMError> {
            self.calls.lock().unwrap().push((query.to_string(), max_results));
            Ok(vec![SearchHit {
                title: "Pizzeria".into(),
                url: "https://example.com".into(),
                snippet: "Wood-fired".into(),
            }])
        }
    }

    #[tokio::test]
    async fn limits_requested_results() {
        let search = Arc::new(FakeSearch::default());
        let tool = WebSearchTool::new(search.clone(), 5);

        let output = tool
            .call(r#"{"query": "pizza rome", "max_results": 50}"#)
            .await
            .unwrap();
        let hits: Vec<SearchHit> = serde_json::from_str(&output).unwrap();
        assert_eq!(hits[0].title, "Pizzeria");

        tool.call(r#"{"query": "pizza"}"#).await.unwrap();
        let calls = search.calls.lock().unwrap();
        assert_eq!(calls[0], ("pizza rome".to_string(), 5));
        assert_eq!(calls[1], ("pizza".to_string(), 5));
    }

    #[tokio::test]
    async fn bad_arguments_are_tool_errors() {
        let tool = WebSearchTool::new(Arc::new(FakeSearch::default()), 5);
        let err = tool.call("{\"q\": 1}").await.unwrap_err();
        assert!(matches!(err, LLMError::ToolConfigError(_)));
    }

    #[test]
    fn definition_requires_query() {
        let tool = WebSearchTool::new(Arc::new(FakeSearch::default()), 5);
        let def = tool.definition();
        assert_eq!(def.function.name, WEB_SEARCH_TOOL);
        assert_eq!(def.function.parameters["required"][0], "query");
    }
}
