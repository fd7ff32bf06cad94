//! Wiring of the store, repository and tool registry from configuration

use crate::config::{SheetsConfig, ToolsConfig};
use std::sync::Arc;
use std::time::Duration;
use ticket_assist_core::categorizer::Categorizer;
use ticket_assist_core::store::TicketStore;
use ticket_assist_core::TicketRepository;
use ticket_assist_sheets::{
    ServiceAccountKey, SheetsClient, SheetsError, SheetsTicketStore, TokenSource,
};
use ticket_assist_tools::{
    knowledge_base_tool, ticket_tools, web_search_tool, with_retry, ToolConfig, ToolRegistry,
    WebSearchConfig,
};

/// Attempts for the HTTP-backed tools
const HTTP_TOOL_ATTEMPTS: u32 = 3;

/// First backoff delay for the HTTP-backed tools
const HTTP_TOOL_BACKOFF: Duration = Duration::from_millis(250);

/// Open the ticket sheet
///
/// A configured access token wins over the keyfile.
///
/// # Errors
///
/// Returns `SheetsError::Credentials` if the keyfile cannot be read.
pub fn sheets_store(config: &SheetsConfig) -> Result<SheetsTicketStore, SheetsError> {
    let auth = match &config.access_token {
        Some(token) => TokenSource::Static(token.clone()),
        None => TokenSource::service_account(ServiceAccountKey::from_file(
            &config.credentials_path,
        )?),
    };
    let client = SheetsClient::new(config.spreadsheet_id.clone(), auth);
    Ok(SheetsTicketStore::new(client, config.sheet.clone()))
}

/// Register every available tool
///
/// Ticket tools always run and are registered bare: they answer with text
/// even on store failures, and a store write must never be cut off halfway.
/// The knowledge base and web search are only registered when configured,
/// and are retried with backoff under the configured timeout.
#[must_use]
pub fn build_registry<S, C>(
    repository: &Arc<TicketRepository<S, C>>,
    config: &ToolsConfig,
) -> ToolRegistry
where
    S: TicketStore + 'static,
    C: Categorizer + 'static,
{
    let registry = ToolRegistry::new();
    let retried =
        ToolConfig::exponential_backoff(HTTP_TOOL_ATTEMPTS, HTTP_TOOL_BACKOFF).with_timeout(config.timeout);

    for (tool, executor) in ticket_tools(repository) {
        registry.register(tool, executor);
    }

    match &config.knowledge_base_url {
        Some(url) => {
            let (tool, executor) = knowledge_base_tool(url.clone(), config.timeout);
            registry.register(tool, with_retry(retried.clone(), executor));
        }
        None => tracing::warn!("KNOWLEDGE_BASE_URL not set; knowledge_base tool disabled"),
    }

    match &config.tavily_api_key {
        Some(key) => {
            let search = WebSearchConfig::new(key.clone()).with_timeout(config.timeout);
            let (tool, executor) = web_search_tool(search);
            registry.register(tool, with_retry(retried, executor));
        }
        None => tracing::warn!("TAVILY_API_KEY not set; web_search tool disabled"),
    }

    tracing::info!(tools = ?registry.list_tools(), "Tools registered");
    registry
}
