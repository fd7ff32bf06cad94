//! Agent tools for the ticket assistant
//!
//! Every tool is a [`Tool`] definition paired with a [`ToolExecutorFn`]. The
//! assistant registers them in a [`ToolRegistry`] and dispatches the model's
//! tool calls through it.
//!
//! ## Modules
//!
//! - `ticket`: ticket lookup, save, status update and metrics over a `TicketRepository`
//! - `knowledge`: retrieval QA service (`knowledge_base`)
//! - `search`: Tavily web search (`web_search`)
//! - `registry`: tool registry for dynamic tool management
//! - `retry`: retry policies and timeout handling
//!
//! Ticket tools always answer `Ok` with text. The HTTP tools return `Err` on
//! transport failures so they can be wrapped with [`retry::with_retry`].

pub mod knowledge;
pub mod registry;
pub mod retry;
pub mod search;
pub mod ticket;

pub use ticket_assist_core::agent::{Tool, ToolExecutorFn, ToolResult};

// Re-export commonly used types
pub use knowledge::knowledge_base_tool;
pub use registry::ToolRegistry;
pub use retry::{execute_with_retry, with_retry, RetryPolicy, ToolConfig};
pub use search::{web_search_tool, WebSearchConfig};
pub use ticket::{
    save_ticket_tool, ticket_lookup_tool, ticket_metrics_tool, ticket_tools,
    update_ticket_status_tool,
};
