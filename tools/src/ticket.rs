//! Ticket tools backed by a [`TicketRepository`]
//!
//! Provides four tools:
//! - `ticket_lookup`: find a ticket by an id mentioned in free text
//! - `save_ticket`: create or overwrite a ticket
//! - `update_ticket_status`: set a ticket's status
//! - `ticket_metrics`: summary report over every ticket
//!
//! These tools never return `Err`. Validation problems and store failures
//! come back as text the model can relay, store failures prefixed with
//! `Warning:`.

use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use ticket_assist_core::agent::{Tool, ToolExecutorFn, ToolFuture};
use ticket_assist_core::categorizer::Categorizer;
use ticket_assist_core::store::TicketStore;
use ticket_assist_core::{Category, TicketDraft, TicketError, TicketRepository};

/// Tool name of [`ticket_lookup_tool`]
pub const TICKET_LOOKUP: &str = "ticket_lookup";
/// Tool name of [`save_ticket_tool`]
pub const SAVE_TICKET: &str = "save_ticket";
/// Tool name of [`update_ticket_status_tool`]
pub const UPDATE_TICKET_STATUS: &str = "update_ticket_status";
/// Tool name of [`ticket_metrics_tool`]
pub const TICKET_METRICS: &str = "ticket_metrics";

#[derive(Deserialize)]
struct LookupInput {
    #[serde(alias = "ticket_id", alias = "input")]
    query: String,
}

#[derive(Deserialize)]
struct StatusInput {
    #[serde(default)]
    input: Option<String>,
    #[serde(default)]
    ticket_id: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

impl StatusInput {
    /// The `"ID"` / `"ID, status"` form the repository accepts
    fn into_raw(self) -> Option<String> {
        if let Some(raw) = self.input {
            return Some(raw);
        }
        let id = self.ticket_id?;
        Some(match self.status {
            Some(status) => format!("{id}, {status}"),
            None => id,
        })
    }
}

/// Create the `ticket_lookup` tool
///
/// Returns the ticket rendered as one sentence, or a not-found message.
#[must_use]
pub fn ticket_lookup_tool<S, C>(repository: Arc<TicketRepository<S, C>>) -> (Tool, ToolExecutorFn)
where
    S: TicketStore + 'static,
    C: Categorizer + 'static,
{
    let tool = Tool {
        name: TICKET_LOOKUP.to_string(),
        description: "Look up a support ticket by its ID (e.g. TIC123). The query may be any \
                      text that mentions the ticket ID."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Text containing the ticket ID"
                }
            },
            "required": ["query"]
        }),
    };

    let executor = Arc::new(move |input: String| {
        let repository = Arc::clone(&repository);
        Box::pin(async move {
            let query = serde_json::from_str::<LookupInput>(&input)
                .map_or(input, |parsed| parsed.query);

            Ok(match repository.lookup(&query).await {
                Ok(lookup) => lookup.to_string(),
                Err(err) => warning("Error looking up ticket", &err),
            })
        }) as ToolFuture
    }) as ToolExecutorFn;

    (tool, executor)
}

/// Create the `save_ticket` tool
///
/// The category is optional; when absent it is assigned automatically.
#[must_use]
pub fn save_ticket_tool<S, C>(repository: Arc<TicketRepository<S, C>>) -> (Tool, ToolExecutorFn)
where
    S: TicketStore + 'static,
    C: Categorizer + 'static,
{
    let labels: Vec<&str> = Category::LABELS.iter().map(|c| c.as_str()).collect();
    let tool = Tool {
        name: SAVE_TICKET.to_string(),
        description: "Save a new support ticket or update an existing one. Requires the ticket \
                      ID, the issue description and the user's email. The category is \
                      optional and assigned automatically when omitted."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "ticket_id": {"type": "string", "description": "Ticket ID, e.g. TIC123"},
                "content": {"type": "string", "description": "Description of the issue"},
                "user_email": {"type": "string", "description": "Email of the user raising the ticket"},
                "category": {"type": "string", "enum": labels, "description": "Optional category"}
            },
            "required": ["ticket_id", "content", "user_email"]
        }),
    };

    let executor = Arc::new(move |input: String| {
        let repository = Arc::clone(&repository);
        Box::pin(async move {
            let draft = match serde_json::from_str::<TicketDraft>(&input) {
                Ok(draft) => draft,
                Err(err) => return Ok(format!("Invalid ticket input: {err}")),
            };

            Ok(match repository.save(draft).await {
                Ok(outcome) => outcome.to_string(),
                Err(TicketError::MissingField(field)) => {
                    format!("Missing required ticket information: {field}.")
                }
                Err(err @ TicketError::InvalidId(_)) => err.to_string(),
                Err(err) => warning("Error saving ticket", &err),
            })
        }) as ToolFuture
    }) as ToolExecutorFn;

    (tool, executor)
}

/// Create the `update_ticket_status` tool
///
/// Accepts `{"input": "TIC123, closed"}` or `{"ticket_id": ..., "status": ...}`;
/// a missing status means `pending`.
#[must_use]
pub fn update_ticket_status_tool<S, C>(
    repository: Arc<TicketRepository<S, C>>,
) -> (Tool, ToolExecutorFn)
where
    S: TicketStore + 'static,
    C: Categorizer + 'static,
{
    let tool = Tool {
        name: UPDATE_TICKET_STATUS.to_string(),
        description: "Update the status of a support ticket, e.g. to 'closed'. If no status is \
                      given the ticket is set back to 'pending'."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "ticket_id": {"type": "string", "description": "Ticket ID, e.g. TIC123"},
                "status": {"type": "string", "description": "New status, e.g. closed or pending"}
            },
            "required": ["ticket_id"]
        }),
    };

    let executor = Arc::new(move |input: String| {
        let repository = Arc::clone(&repository);
        Box::pin(async move {
            let raw = match serde_json::from_str::<StatusInput>(&input) {
                Ok(parsed) => parsed.into_raw(),
                Err(_) => Some(input),
            };
            let Some(raw) = raw else {
                return Ok("Missing required field: ticket_id.".to_string());
            };

            Ok(match repository.update_status(&raw).await {
                Ok(update) => update.to_string(),
                Err(err @ TicketError::InvalidId(_)) => err.to_string(),
                Err(err) => warning("Error updating ticket status", &err),
            })
        }) as ToolFuture
    }) as ToolExecutorFn;

    (tool, executor)
}

/// Create the `ticket_metrics` tool
///
/// Returns totals, resolution rate, per-category counts, frequent requests
/// and low-coverage categories as plain text.
#[must_use]
pub fn ticket_metrics_tool<S, C>(repository: Arc<TicketRepository<S, C>>) -> (Tool, ToolExecutorFn)
where
    S: TicketStore + 'static,
    C: Categorizer + 'static,
{
    let tool = Tool {
        name: TICKET_METRICS.to_string(),
        description: "Summarise all support tickets: totals, resolution percentage, counts by \
                      status and category, most repeated requests and categories with few \
                      tickets."
            .to_string(),
        input_schema: json!({"type": "object", "properties": {}}),
    };

    let executor = Arc::new(move |_input: String| {
        let repository = Arc::clone(&repository);
        Box::pin(async move {
            Ok(match repository.metrics().await {
                Ok(metrics) => metrics.to_string(),
                Err(err) => warning("Error computing ticket metrics", &err),
            })
        }) as ToolFuture
    }) as ToolExecutorFn;

    (tool, executor)
}

/// All four ticket tools over one repository
#[must_use]
pub fn ticket_tools<S, C>(repository: &Arc<TicketRepository<S, C>>) -> Vec<(Tool, ToolExecutorFn)>
where
    S: TicketStore + 'static,
    C: Categorizer + 'static,
{
    vec![
        ticket_lookup_tool(Arc::clone(repository)),
        save_ticket_tool(Arc::clone(repository)),
        update_ticket_status_tool(Arc::clone(repository)),
        ticket_metrics_tool(Arc::clone(repository)),
    ]
}

fn warning(context: &str, err: &TicketError) -> String {
    tracing::warn!(error = %err, "{context}");
    format!("Warning: {context}: {err}")
}
