//! Tool-using chat agent
//!
//! Each question runs one turn: the model is called with the conversation so
//! far and the registered tools; every `tool_use` block it returns is executed
//! through the [`ToolRegistry`] and fed back as a `tool_result`, until the
//! model answers in plain text. A turn is bounded by an iteration count and a
//! wall-clock budget. The budget cuts off a model call that is still waiting
//! and is checked again before each iteration, but a tool call always runs
//! to completion so a store write is never abandoned halfway.
//!
//! Only the question and the final answer are kept in the history, so a
//! failed or interrupted turn leaves the conversation as it was.

use crate::config::AgentLimits;
use crate::metrics;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{timeout_at, Instant};
use ticket_assist_anthropic::{
    AnthropicClient, ClaudeError, ContentBlock, Message, MessagesRequest, StopReason,
};
use ticket_assist_tools::ToolRegistry;

/// System prompt of the ticket assistant
pub const SYSTEM_PROMPT: &str = "You are a helpful ticket assistant for a travel booking support \
desk. Answer general questions with the knowledge_base tool and fall back to web_search only when \
the knowledge base has no answer. Use ticket_lookup for questions about a specific ticket ID, \
save_ticket to raise or update a ticket, update_ticket_status to change a ticket's status and \
ticket_metrics for summaries across all tickets. Tool results are authoritative; relay warnings \
to the user. Keep answers short.";

/// Answer used when the model ends a turn without any text
pub const EMPTY_ANSWER: &str = "No response from agent.";

/// Errors that end a turn without an answer
#[derive(Debug, Error)]
pub enum AgentError {
    /// The LLM call failed
    #[error(transparent)]
    Claude(#[from] ClaudeError),

    /// The model kept calling tools past the iteration budget
    #[error("Agent stopped after {0} iterations without a final answer")]
    IterationLimit(usize),

    /// The turn ran past the time budget
    #[error("Agent stopped after {0:?} without a final answer")]
    Timeout(Duration),
}

impl AgentError {
    /// Outcome label for the turn counter
    #[must_use]
    pub const fn outcome(&self) -> &'static str {
        match self {
            Self::Claude(_) => "failed",
            Self::IterationLimit(_) => "iteration_limit",
            Self::Timeout(_) => "timeout",
        }
    }
}

/// Model settings for the agent
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Model name
    pub model: String,
    /// Max tokens per response
    pub max_tokens: u32,
    /// System prompt
    pub system_prompt: String,
    /// Turn limits
    pub limits: AgentLimits,
}

impl AgentConfig {
    /// Configuration with the ticket assistant prompt
    #[must_use]
    pub fn new(model: impl Into<String>, max_tokens: u32, limits: AgentLimits) -> Self {
        Self {
            model: model.into(),
            max_tokens,
            system_prompt: SYSTEM_PROMPT.to_string(),
            limits,
        }
    }
}

/// Conversational agent over a tool registry
#[derive(Debug)]
pub struct Agent {
    client: AnthropicClient,
    registry: ToolRegistry,
    config: AgentConfig,
    history: Vec<Message>,
}

impl Agent {
    /// Create an agent with an empty conversation
    #[must_use]
    pub const fn new(client: AnthropicClient, registry: ToolRegistry, config: AgentConfig) -> Self {
        Self {
            client,
            registry,
            config,
            history: Vec::new(),
        }
    }

    /// Messages kept from earlier turns
    #[must_use]
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Answer one question
    ///
    /// # Errors
    ///
    /// Returns `AgentError` if the model call fails or the turn exceeds its
    /// iteration or time budget. The history is unchanged in that case.
    pub async fn ask(&mut self, question: &str) -> Result<String, AgentError> {
        let result = self.run_turn(question).await;

        match &result {
            Ok(answer) => {
                self.history.push(Message::user(question));
                self.history.push(Message::assistant(answer.clone()));
                metrics::record_turn("answered");
            }
            Err(err) => {
                tracing::warn!(error = %err, "Agent turn failed");
                metrics::record_turn(err.outcome());
            }
        }
        result
    }

    async fn run_turn(&self, question: &str) -> Result<String, AgentError> {
        let mut messages = self.history.clone();
        messages.push(Message::user(question));
        let tools = self.registry.get_tools();
        let budget = self.config.limits.max_execution_time;
        let deadline = Instant::now() + budget;

        for iteration in 1..=self.config.limits.max_iterations {
            if Instant::now() >= deadline {
                return Err(AgentError::Timeout(budget));
            }
            let mut request = MessagesRequest::new(messages.clone())
                .with_model(self.config.model.clone())
                .with_max_tokens(self.config.max_tokens)
                .with_system(self.config.system_prompt.clone());
            if !tools.is_empty() {
                request = request.with_tools(tools.clone());
            }

            let Ok(response) = timeout_at(deadline, self.client.messages(request)).await else {
                return Err(AgentError::Timeout(budget));
            };
            let response = response?;
            let tool_uses = response.tool_uses();
            tracing::debug!(
                iteration,
                tool_calls = tool_uses.len(),
                stop_reason = ?response.stop_reason,
                "Model responded"
            );

            if response.stop_reason != StopReason::ToolUse || tool_uses.is_empty() {
                let answer = response.text();
                return Ok(if answer.is_empty() {
                    EMPTY_ANSWER.to_string()
                } else {
                    answer
                });
            }

            let mut results = Vec::with_capacity(tool_uses.len());
            for (id, name, input) in tool_uses {
                tracing::info!(tool = name, "Calling tool");
                metrics::record_tool_call(name);
                let block = match self.registry.execute(name, input.to_string()).await {
                    Ok(output) => ContentBlock::tool_result(id, output, false),
                    Err(err) => {
                        tracing::warn!(tool = name, error = %err, "Tool failed");
                        ContentBlock::tool_result(id, err.message, true)
                    }
                };
                results.push(block);
            }

            messages.push(Message::assistant_blocks(response.content.clone()));
            messages.push(Message::tool_results(results));
        }

        Err(AgentError::IterationLimit(self.config.limits.max_iterations))
    }
}
