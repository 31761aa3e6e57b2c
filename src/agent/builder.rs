//! Agent builder for assembling a model, its instructions and its tools.

use std::sync::Arc;

use super::{Agent, AgentTool, DEFAULT_MAX_TURNS};
use crate::{error::LLMError, LLMProvider};

/// Builder for [`Agent`].
pub struct AgentBuilder {
    llm: Option<Arc<dyn LLMProvider>>,
    instructions: String,
    tools: Vec<Arc<dyn AgentTool>>,
    max_turns: u32,
}

impl AgentBuilder {
    /// Creates a new AgentBuilder instance.
    pub fn new() -> Self {
        Self {
            llm: None,
            instructions: String::new(),
            tools: Vec::new(),
            max_turns: DEFAULT_MAX_TURNS,
        }
    }

    /// Sets the model the agent thinks with.
    pub fn llm(mut self, llm: Arc<dyn LLMProvider>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Sets the operating instruction, sent as the system message of every run.
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Adds a tool the model may call.
    pub fn tool(mut self, tool: impl AgentTool + 'static) -> Self {
        self.tools.push(Arc::new(tool));
        self
    }

    /// Sets the maximum number of model calls per run.
    ///
    /// This bounds tool-calling loops.
    pub fn max_turns(mut self, max: u32) -> Self {
        self.max_turns = max;
        self
    }

    /// Builds the agent.
    ///
    /// # Errors
    ///
    /// Returns an error if no model was set, the turn budget is zero, or two
    /// tools share a name.
    pub fn build(self) -> Result<Agent, LLMError> {
        let llm = self
            .llm
            .ok_or_else(|| LLMError::InvalidRequest("No model configured for agent".to_string()))?;
        if self.max_turns == 0 {
            return Err(LLMError::InvalidRequest(
                "Agent needs at least one turn".to_string(),
            ));
        }

        let mut names: Vec<String> = self
            .tools
            .iter()
            .map(|t| t.definition().function.name)
            .collect();
        names.sort();
        if let Some(pair) = names.windows(2).find(|w| w[0] == w[1]) {
            return Err(LLMError::ToolConfigError(format!(
                "Duplicate tool name: {}",
                pair[0]
            )));
        }

        Ok(Agent {
            llm,
            instructions: self.instructions,
            tools: self.tools,
            max_turns: self.max_turns,
        })
    }
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::builder::{FunctionBuilder, LLMBackend, LLMBuilder};
    use crate::chat::Tool;

    struct Named(&'static str);

    #[async_trait]
    impl AgentTool for Named {
        fn definition(&self) -> Tool {
            FunctionBuilder::new(self.0).build()
        }

        async fn call(&self, _arguments: &str) -> Result<String, LLMError> {
            Ok(String::new())
        }
    }

    fn llm() -> Arc<dyn LLMProvider> {
        LLMBuilder::new()
            .backend(LLMBackend::Groq)
            .api_key("test")
            .build_shared()
            .unwrap()
    }

    #[test]
    fn requires_a_model() {
        assert!(AgentBuilder::new().build().is_err());
    }

    #[test]
    fn rejects_zero_turns() {
        assert!(AgentBuilder::new().llm(llm()).max_turns(0).build().is_err());
    }

    #[test]
    fn rejects_duplicate_tools() {
        let err = AgentBuilder::new()
            .llm(llm())
            .tool(Named("web_search"))
            .tool(Named("web_search"))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, LLMError::ToolConfigError(_)));
    }

    #[test]
    fn keeps_instructions() {
        let agent = AgentBuilder::new()
            .llm(llm())
            .instructions("best pizza in Rome")
            .tool(Named("web_search"))
            .build()
            .unwrap();
        assert_eq!(agent.instructions(), "best pizza in Rome");
    }
}
