//! Knowledge-base tool
//!
//! Forwards the question to a retrieval QA service and renders its answer
//! with the source documents it cites.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use ticket_assist_core::agent::{Tool, ToolError, ToolExecutorFn, ToolFuture};

/// Tool name of [`knowledge_base_tool`]
pub const KNOWLEDGE_BASE: &str = "knowledge_base";

#[derive(Deserialize)]
struct KnowledgeInput {
    #[serde(alias = "query", alias = "input")]
    question: String,
}

#[derive(Serialize)]
struct QaRequest<'a> {
    question: &'a str,
}

#[derive(Debug, Deserialize)]
struct QaResponse {
    answer: String,
    #[serde(default)]
    sources: Vec<String>,
}

impl QaResponse {
    fn render(&self) -> String {
        if self.sources.is_empty() {
            return self.answer.clone();
        }
        let mut out = format!("{}\n\nSources:", self.answer);
        for source in &self.sources {
            out.push_str("\n- ");
            out.push_str(source);
        }
        out
    }
}

/// Create the `knowledge_base` tool against a QA endpoint
///
/// The endpoint receives `{"question": ...}` and answers
/// `{"answer": ..., "sources": [...]}`. Transport failures are returned as
/// `Err` so the retry wrapper can try again.
#[must_use]
pub fn knowledge_base_tool(url: impl Into<String>, timeout: Duration) -> (Tool, ToolExecutorFn) {
    let tool = Tool {
        name: KNOWLEDGE_BASE.to_string(),
        description: "Answer questions about bookings, cancellations, refunds, baggage and \
                      other travel support topics from the company knowledge base. Use this \
                      first for general questions."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "question": {
                    "type": "string",
                    "description": "The question to answer"
                }
            },
            "required": ["question"]
        }),
    };

    let url = Arc::new(url.into());
    let http = reqwest::Client::new();

    let executor = Arc::new(move |input: String| {
        let url = Arc::clone(&url);
        let http = http.clone();
        Box::pin(async move {
            let parsed: KnowledgeInput =
                serde_json::from_str(&input).map_err(|e| ToolError::invalid_input(&e))?;

            let response = http
                .post(url.as_str())
                .timeout(timeout)
                .json(&QaRequest {
                    question: &parsed.question,
                })
                .send()
                .await
                .map_err(|e| ToolError::new(format!("Knowledge base request failed: {e}")))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ToolError::new(format!(
                    "Knowledge base returned {status}: {body}"
                )));
            }

            let answer: QaResponse = response.json().await.map_err(|e| {
                ToolError::new(format!("Knowledge base response was malformed: {e}"))
            })?;
            tracing::debug!(sources = answer.sources.len(), "Knowledge base answered");

            Ok(answer.render())
        }) as ToolFuture
    }) as ToolExecutorFn;

    (tool, executor)
}
