//! Tool types shared by the assistant and its tools
//!
//! A tool is a [`Tool`] definition (name, description, JSON input schema) sent
//! to the LLM, paired with a [`ToolExecutorFn`] that receives the raw JSON
//! input the model produced and returns a string for the model to read.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use ticket_assist_core::agent::{Tool, ToolExecutorFn, ToolFuture};
//!
//! let tool = Tool {
//!     name: "echo".to_string(),
//!     description: "Repeat the input".to_string(),
//!     input_schema: serde_json::json!({"type": "object"}),
//! };
//! let executor: ToolExecutorFn =
//!     Arc::new(|input: String| Box::pin(async move { Ok(input) }) as ToolFuture);
//! # let _ = (tool, executor);
//! ```

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub use ticket_assist_anthropic::{
    ContentBlock, Message, MessagesRequest, MessagesResponse, Role, StopReason, Tool, Usage,
};

/// Result from tool execution
pub type ToolResult = Result<String, ToolError>;

/// Boxed future returned by a tool executor
pub type ToolFuture = Pin<Box<dyn Future<Output = ToolResult> + Send>>;

/// Type-erased async tool executor taking the tool's JSON input
pub type ToolExecutorFn = Arc<dyn Fn(String) -> ToolFuture + Send + Sync>;

/// Tool execution errors
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolError {
    /// Error message
    pub message: String,
}

impl ToolError {
    /// Build an error from any message
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Error for tool input that is not valid JSON for the tool's schema
    #[must_use]
    pub fn invalid_input(err: &serde_json::Error) -> Self {
        Self::new(format!("Invalid input: {err}"))
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ToolError {}
