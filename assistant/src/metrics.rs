//! Usage metrics for the assistant.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `ticket_assist_tool_calls_total{tool}` - Tool invocations by tool name
//! - `ticket_assist_agent_turns_total{outcome}` - Answered questions by outcome
//!   (`answered`, `failed`, `iteration_limit`, `timeout`)
//!
//! No exporter is installed by the binary; the counters go to whatever
//! recorder the embedding process provides.

use metrics::describe_counter;

/// Counter of tool invocations
pub const TOOL_CALLS: &str = "ticket_assist_tool_calls_total";

/// Counter of agent turns
pub const AGENT_TURNS: &str = "ticket_assist_agent_turns_total";

/// Register metric descriptions.
///
/// This should be called once at application startup, before any metrics are recorded.
pub fn register_metrics() {
    describe_counter!(TOOL_CALLS, "Total number of tool invocations by tool name");
    describe_counter!(
        AGENT_TURNS,
        "Total number of agent turns by outcome (answered, failed, iteration_limit, timeout)"
    );

    tracing::debug!("Assistant metrics registered");
}

/// Record one tool invocation
pub fn record_tool_call(tool: &str) {
    metrics::counter!(TOOL_CALLS, "tool" => tool.to_string()).increment(1);
}

/// Record the end of an agent turn
pub fn record_turn(outcome: &'static str) {
    metrics::counter!(AGENT_TURNS, "outcome" => outcome).increment(1);
    tracing::debug!(outcome, "Recorded agent turn");
}
