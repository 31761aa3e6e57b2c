//! Agent module: a model that may call tools before giving its final answer.

mod builder;
mod web_search;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    chat::{ChatMessage, ChatProvider, Tool},
    error::LLMError,
    FunctionCall, LLMProvider, ToolCall,
};

pub use builder::AgentBuilder;
pub use web_search::WebSearchTool;

/// Default number of model calls an agent may make per run.
pub const DEFAULT_MAX_TURNS: u32 = 4;

/// A capability the agent can invoke by name.
#[async_trait]
pub trait AgentTool: Send + Sync {
    /// Function definition advertised to the model.
    fn definition(&self) -> Tool;

    /// Executes the tool with the model-provided JSON arguments and returns its output.
    async fn call(&self, arguments: &str) -> Result<String, LLMError>;
}

/// Final answer of an agent run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResponse {
    /// Final answer text; `None` when the model answered with nothing usable
    pub content: Option<String>,
    /// Number of tool calls executed before the answer
    pub tool_calls: usize,
}

/// A configured agent. Build one with [`AgentBuilder`].
pub struct Agent {
    llm: Arc<dyn LLMProvider>,
    instructions: String,
    tools: Vec<Arc<dyn AgentTool>>,
    max_turns: u32,
}

impl Agent {
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// Answers `query`, executing any tool calls the model asks for.
    ///
    /// Returns `Ok(None)` when the turn budget runs out before a final answer.
    /// Provider and tool failures are returned as errors.
    pub async fn run(&self, query: &str) -> Result<Option<RunResponse>, LLMError> {
        let definitions: Vec<Tool> = self.tools.iter().map(|t| t.definition()).collect();
        let tools = if definitions.is_empty() {
            None
        } else {
            Some(definitions.as_slice())
        };

        let mut messages = Vec::with_capacity(2 + 2 * self.max_turns as usize);
        if !self.instructions.is_empty() {
            messages.push(ChatMessage::system().content(&self.instructions).build());
        }
        messages.push(ChatMessage::user().content(query).build());

        let mut executed = 0;
        for turn in 1..=self.max_turns {
            let response = self.llm.chat_with_tools(&messages, tools).await?;

            let calls = response.tool_calls().unwrap_or_default();
            if calls.is_empty() {
                let content = response.text().filter(|t| !t.trim().is_empty());
                log::debug!(
                    "agent answered on turn {turn} after {executed} tool calls (content: {})",
                    content.is_some()
                );
                return Ok(Some(RunResponse {
                    content,
                    tool_calls: executed,
                }));
            }

            let mut results = Vec::with_capacity(calls.len());
            for call in &calls {
                log::debug!("agent turn {turn}: calling {call}");
                let output = self.call_tool(call).await?;
                results.push(ToolCall {
                    id: call.id.clone(),
                    call_type: call.call_type.clone(),
                    function: FunctionCall {
                        name: call.function.name.clone(),
                        arguments: output,
                    },
                });
            }
            executed += calls.len();

            messages.push(
                ChatMessage::assistant()
                    .content(response.text().unwrap_or_default())
                    .tool_use(calls)
                    .build(),
            );
            messages.push(ChatMessage::user().tool_result(results).build());
        }

        log::warn!(
            "agent gave up after {} turns without a final answer",
            self.max_turns
        );
        Ok(None)
    }

    async fn call_tool(&self, call: &ToolCall) -> Result<String, LLMError> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.definition().function.name == call.function.name)
            .ok_or_else(|| {
                LLMError::ToolConfigError(format!("Unknown tool: {}", call.function.name))
            })?;
        tool.call(&call.function.arguments).await
    }
}
