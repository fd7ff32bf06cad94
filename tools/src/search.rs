//! Web search tool over the Tavily search API

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use ticket_assist_core::agent::{Tool, ToolError, ToolExecutorFn, ToolFuture};

/// Tool name of [`web_search_tool`]
pub const WEB_SEARCH: &str = "web_search";

/// Public Tavily endpoint
pub const TAVILY_BASE_URL: &str = "https://api.tavily.com";

/// Results requested per search
pub const MAX_RESULTS: u32 = 3;

#[derive(Deserialize)]
struct SearchInput {
    #[serde(alias = "input")]
    query: String,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: u32,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

impl SearchResponse {
    fn render(&self) -> String {
        if self.results.is_empty() {
            return "No results found.".to_string();
        }
        self.results
            .iter()
            .enumerate()
            .map(|(i, hit)| format!("{}. {} ({})\n{}", i + 1, hit.title, hit.url, hit.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Web search tool configuration
#[derive(Clone, Debug)]
pub struct WebSearchConfig {
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl WebSearchConfig {
    /// Configuration for the public endpoint
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: TAVILY_BASE_URL.to_string(),
            timeout: crate::retry::DEFAULT_TIMEOUT,
        }
    }

    /// Point at another endpoint (used by tests)
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Per-request timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Create the `web_search` tool
///
/// Intended as a fallback when the knowledge base has no answer.
#[must_use]
pub fn web_search_tool(config: WebSearchConfig) -> (Tool, ToolExecutorFn) {
    let tool = Tool {
        name: WEB_SEARCH.to_string(),
        description: "Search the web for current information. Use only when the knowledge base \
                      does not have the answer."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query"
                }
            },
            "required": ["query"]
        }),
    };

    let config = Arc::new(config);
    let http = reqwest::Client::new();

    let executor = Arc::new(move |input: String| {
        let config = Arc::clone(&config);
        let http = http.clone();
        Box::pin(async move {
            let parsed: SearchInput =
                serde_json::from_str(&input).map_err(|e| ToolError::invalid_input(&e))?;

            let url = format!("{}/search", config.base_url.trim_end_matches('/'));
            let response = http
                .post(url)
                .timeout(config.timeout)
                .json(&SearchRequest {
                    api_key: &config.api_key,
                    query: &parsed.query,
                    max_results: MAX_RESULTS,
                })
                .send()
                .await
                .map_err(|e| ToolError::new(format!("Web search failed: {e}")))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ToolError::new(format!("Web search returned {status}: {body}")));
            }

            let results: SearchResponse = response
                .json()
                .await
                .map_err(|e| ToolError::new(format!("Web search response was malformed: {e}")))?;
            tracing::debug!(hits = results.results.len(), "Web search completed");

            Ok(results.render())
        }) as ToolFuture
    }) as ToolExecutorFn;

    (tool, executor)
}
