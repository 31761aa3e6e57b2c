use std::fmt;
use std::sync::Arc;

use super::{describe, Description, SearchModel};
use crate::{
    agent::{AgentBuilder, RunResponse, WebSearchTool, DEFAULT_MAX_TURNS},
    error::LLMError,
    registry::ProviderRegistry,
    tools::WebSearch,
};

/// States a single search run moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStage {
    Idle,
    DescriptionGenerating,
    DescriptionReady,
    DescriptionFallback,
    AgentRunning,
    ResultsDisplayed,
    NoResultsNotice,
    ErrorNotice,
}

impl fmt::Display for SearchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// What the user gets to see at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The agent's answer, rendered as markdown
    Results(String),
    /// The agent produced nothing. Not a failure.
    NoResults,
    /// The agent failed; carries the underlying error message
    Error(String),
}

impl SearchOutcome {
    /// Maps the agent's result onto an outcome.
    pub fn from_agent(result: Result<Option<RunResponse>, LLMError>) -> Self {
        match result {
            Ok(Some(RunResponse {
                content: Some(content),
                ..
            })) => SearchOutcome::Results(content),
            Ok(_) => SearchOutcome::NoResults,
            Err(e) => SearchOutcome::Error(e.to_string()),
        }
    }

    fn stage(&self) -> SearchStage {
        match self {
            SearchOutcome::Results(_) => SearchStage::ResultsDisplayed,
            SearchOutcome::NoResults => SearchStage::NoResultsNotice,
            SearchOutcome::Error(_) => SearchStage::ErrorNotice,
        }
    }
}

/// Record of one run: the description used, the outcome and the stages visited.
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub description: Description,
    pub outcome: SearchOutcome,
    pub stages: Vec<SearchStage>,
}

/// Runs the two-stage search flow against prebuilt provider clients.
pub struct SearchPipeline {
    models: Arc<ProviderRegistry>,
    web_search: Arc<dyn WebSearch>,
    max_results: usize,
    max_turns: u32,
}

impl SearchPipeline {
    pub fn new(models: Arc<ProviderRegistry>, web_search: Arc<dyn WebSearch>) -> Self {
        Self {
            models,
            web_search,
            max_results: 5,
            max_turns: DEFAULT_MAX_TURNS,
        }
    }

    /// Caps the number of hits the search tool returns per call.
    pub fn max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Bounds the agent's tool-calling loop.
    pub fn max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Answers `query` with `model`. Never fails: every error ends in
    /// [`SearchOutcome::Error`].
    pub async fn run(&self, query: &str, model: SearchModel) -> SearchReport {
        let mut stages = vec![SearchStage::Idle];
        let mut enter = |stage: SearchStage| {
            log::debug!("search stage: {stage}");
            stages.push(stage);
        };

        let llm = match self.models.get(model) {
            Ok(llm) => llm,
            Err(e) => {
                log::error!("search model {model} unavailable: {e}");
                enter(SearchStage::ErrorNotice);
                return SearchReport {
                    description: Description::Fallback(query.to_string()),
                    outcome: SearchOutcome::Error(e.to_string()),
                    stages,
                };
            }
        };

        enter(SearchStage::DescriptionGenerating);
        let description = describe(llm.as_ref(), query).await;
        if description.is_fallback() {
            enter(SearchStage::DescriptionFallback);
        } else {
            enter(SearchStage::DescriptionReady);
        }
        log::debug!("search description: {}", description.text());

        enter(SearchStage::AgentRunning);
        let result = match AgentBuilder::new()
            .llm(llm)
            .instructions(description.text())
            .tool(WebSearchTool::new(self.web_search.clone(), self.max_results))
            .max_turns(self.max_turns)
            .build()
        {
            Ok(agent) => agent.run(query).await,
            Err(e) => Err(e),
        };
        match &result {
            Err(e) if e.is_transport() => log::error!("search agent could not reach {model}: {e}"),
            Err(e) => log::error!("search agent failed: {e}"),
            Ok(_) => {}
        }

        let outcome = SearchOutcome::from_agent(result);
        enter(outcome.stage());

        SearchReport {
            description,
            outcome,
            stages,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::chat::{ChatMessage, ChatProvider, ChatResponse, ChatRole, Tool};
    use crate::registry::ProviderRegistryBuilder;
    use crate::tools::SearchHit;
    use crate::{LLMProvider, ToolCall};

    #[derive(Debug)]
    struct Reply(Option<String>);

    impl fmt::Display for Reply {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{:?}", self.0)
        }
    }

    impl ChatResponse for Reply {
        fn text(&self) -> Option<String> {
            self.0.clone()
        }

        fn tool_calls(&self) -> Option<Vec<ToolCall>> {
            None
        }
    }

    /// Description calls come without tools, agent calls with them.
    struct TwoStage {
        description: Result<&'static str, ()>,
        agent: Result<Option<&'static str>, ()>,
        agent_systems: Mutex<Vec<String>>,
    }

    impl TwoStage {
        fn new(
            description: Result<&'static str, ()>,
            agent: Result<Option<&'static str>, ()>,
        ) -> Arc<Self> {
            Arc::new(Self {
                description,
                agent,
                agent_systems: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ChatProvider for TwoStage {
        async fn chat_with_tools(
            &self,
            messages: &[ChatMessage],
            tools: Option<&[Tool]>,
        ) -> Result<Box<dyn ChatResponse>, LLMError> {
            let failed = || LLMError::ProviderError("rate limited".into());
            if tools.is_none() {
                let text = self.description.map_err(|_| failed())?;
                return Ok(Box::new(Reply(Some(text.to_string()))));
            }
            let system = messages
                .iter()
                .find(|m| m.role == ChatRole::System)
                .map(|m| m.content.clone())
                .unwrap_or_default();
            self.agent_systems.lock().unwrap().push(system);
            let text = self.agent.map_err(|_| failed())?;
            Ok(Box::new(Reply(text.map(str::to_string))))
        }
    }

    impl LLMProvider for TwoStage {}

    struct NoSearch;

    #[async_trait]
    impl WebSearch for NoSearch {
        async fn search(&self, _query: &str, _max: usize) -> Result<Vec<SearchHit>, LLMError> {
            Ok(vec![])
        }
    }

    fn pipeline(llm: Arc<TwoStage>) -> SearchPipeline {
        let registry = ProviderRegistryBuilder::new()
            .register(SearchModel::Gemma2, llm)
            .build();
        SearchPipeline::new(Arc::new(registry), Arc::new(NoSearch))
    }

    #[tokio::test]
    async fn failed_description_uses_the_query_as_instruction() {
        let llm = TwoStage::new(Err(()), Ok(Some("Try Da Remo.")));
        let report = pipeline(llm.clone())
            .run("best pizza in Rome", SearchModel::Gemma2)
            .await;

        assert_eq!(
            *llm.agent_systems.lock().unwrap(),
            vec!["best pizza in Rome".to_string()]
        );
        assert_eq!(report.description, Description::Fallback("best pizza in Rome".into()));
        assert_eq!(report.outcome, SearchOutcome::Results("Try Da Remo.".into()));
        assert_eq!(
            report.stages,
            vec![
                SearchStage::Idle,
                SearchStage::DescriptionGenerating,
                SearchStage::DescriptionFallback,
                SearchStage::AgentRunning,
                SearchStage::ResultsDisplayed,
            ]
        );
    }

    #[tokio::test]
    async fn generated_description_becomes_the_instruction() {
        let llm = TwoStage::new(Ok(" Pizzerias in Rome. "), Ok(Some("X")));
        let report = pipeline(llm.clone()).run("pizza", SearchModel::Gemma2).await;

        assert_eq!(llm.agent_systems.lock().unwrap()[0], "Pizzerias in Rome.");
        assert_eq!(report.outcome, SearchOutcome::Results("X".into()));
        assert_eq!(report.stages[2], SearchStage::DescriptionReady);
    }

    #[tokio::test]
    async fn blank_description_runs_the_agent_without_instruction() {
        let llm = TwoStage::new(Ok("  \n"), Ok(Some("X")));
        let report = pipeline(llm.clone()).run("pizza", SearchModel::Gemma2).await;

        assert_eq!(report.description, Description::Generated(String::new()));
        assert_eq!(report.stages[2], SearchStage::DescriptionReady);
        // No system message reaches the agent call.
        assert_eq!(llm.agent_systems.lock().unwrap()[0], "");
        assert_eq!(report.outcome, SearchOutcome::Results("X".into()));
    }

    #[tokio::test]
    async fn empty_answer_is_no_results_not_an_error() {
        let llm = TwoStage::new(Ok("d"), Ok(None));
        let report = pipeline(llm).run("pizza", SearchModel::Gemma2).await;
        assert_eq!(report.outcome, SearchOutcome::NoResults);
        assert_eq!(report.stages.last(), Some(&SearchStage::NoResultsNotice));
    }

    #[tokio::test]
    async fn agent_failure_is_an_error_notice() {
        let llm = TwoStage::new(Ok("d"), Err(()));
        let report = pipeline(llm).run("pizza", SearchModel::Gemma2).await;
        assert!(matches!(report.outcome, SearchOutcome::Error(_)));
        assert_eq!(report.stages.last(), Some(&SearchStage::ErrorNotice));
    }

    #[tokio::test]
    async fn unregistered_model_is_an_error_notice() {
        let llm = TwoStage::new(Ok("d"), Ok(Some("X")));
        let report = pipeline(llm).run("pizza", SearchModel::Mixtral).await;
        assert!(matches!(report.outcome, SearchOutcome::Error(_)));
        assert_eq!(report.stages, vec![SearchStage::Idle, SearchStage::ErrorNotice]);
    }

    #[test]
    fn outcome_mapping() {
        let answer = |content: Option<&str>| {
            Ok(Some(RunResponse {
                content: content.map(str::to_string),
                tool_calls: 0,
            }))
        };
        assert_eq!(
            SearchOutcome::from_agent(answer(Some("X"))),
            SearchOutcome::Results("X".into())
        );
        assert_eq!(SearchOutcome::from_agent(answer(None)), SearchOutcome::NoResults);
        assert_eq!(SearchOutcome::from_agent(Ok(None)), SearchOutcome::NoResults);
        assert!(matches!(
            SearchOutcome::from_agent(Err(LLMError::HttpError("timeout".into()))),
            SearchOutcome::Error(_)
        ));
    }
}
