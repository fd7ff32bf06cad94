//! Configuration management for the assistant.
//!
//! Loads configuration from environment variables with sensible defaults.
//! `main` loads a `.env` file first, so either source works.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use ticket_assist_anthropic::DEFAULT_MODEL;

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or blank
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    /// A variable is set but does not parse
    #[error("Invalid value for {name}: '{value}'")]
    Invalid {
        /// Variable name
        name: &'static str,
        /// Raw value
        value: String,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// LLM configuration
    pub anthropic: AnthropicConfig,
    /// Agent loop limits
    pub agent: AgentLimits,
    /// Ticket sheet configuration
    pub sheets: SheetsConfig,
    /// Knowledge base and web search configuration
    pub tools: ToolsConfig,
}

/// LLM configuration
#[derive(Clone)]
pub struct AnthropicConfig {
    /// API key (`ANTHROPIC_API_KEY`)
    pub api_key: String,
    /// Model answering questions (`ASSISTANT_MODEL`)
    pub model: String,
    /// Model classifying tickets (`CATEGORIZER_MODEL`)
    pub categorizer_model: String,
    /// Max tokens per agent response (`ASSISTANT_MAX_TOKENS`)
    pub max_tokens: u32,
}

/// Agent loop limits
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AgentLimits {
    /// Model calls per question (`ASSISTANT_MAX_ITERATIONS`)
    pub max_iterations: usize,
    /// Wall-clock budget per question (`ASSISTANT_MAX_EXECUTION_SECS`)
    pub max_execution_time: Duration,
}

impl Default for AgentLimits {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            max_execution_time: Duration::from_secs(100),
        }
    }
}

/// Ticket sheet configuration
#[derive(Clone)]
pub struct SheetsConfig {
    /// Spreadsheet id (`SHEET_ID`)
    pub spreadsheet_id: String,
    /// Worksheet name (`SHEET_RANGE`)
    pub sheet: String,
    /// Service-account keyfile (`GOOGLE_CREDENTIALS_PATH`)
    pub credentials_path: PathBuf,
    /// Pre-issued bearer token used instead of the keyfile (`SHEETS_ACCESS_TOKEN`)
    pub access_token: Option<String>,
}

/// Knowledge base and web search configuration
#[derive(Clone)]
pub struct ToolsConfig {
    /// Retrieval QA endpoint (`KNOWLEDGE_BASE_URL`); tool disabled when unset
    pub knowledge_base_url: Option<String>,
    /// Tavily key (`TAVILY_API_KEY`); tool disabled when unset
    pub tavily_api_key: Option<String>,
    /// Per-call tool timeout (`TOOL_TIMEOUT_SECS`)
    pub timeout: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("model", &self.anthropic.model)
            .field("categorizer_model", &self.anthropic.categorizer_model)
            .field("max_tokens", &self.anthropic.max_tokens)
            .field("agent", &self.agent)
            .field("spreadsheet_id", &self.sheets.spreadsheet_id)
            .field("sheet", &self.sheets.sheet)
            .field("credentials_path", &self.sheets.credentials_path)
            .field("static_token", &self.sheets.access_token.is_some())
            .field("knowledge_base_url", &self.tools.knowledge_base_url)
            .field("web_search", &self.tools.tavily_api_key.is_some())
            .field("tool_timeout", &self.tools.timeout)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a numeric
    /// one does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from any variable source
    ///
    /// Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a numeric
    /// one does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| var(name).ok_or(ConfigError::Missing(name));
        let defaults = AgentLimits::default();

        Ok(Self {
            anthropic: AnthropicConfig {
                api_key: required("ANTHROPIC_API_KEY")?,
                model: var("ASSISTANT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                categorizer_model: var("CATEGORIZER_MODEL")
                    .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                max_tokens: parsed(&var, "ASSISTANT_MAX_TOKENS", 1024)?,
            },
            agent: AgentLimits {
                max_iterations: parsed(&var, "ASSISTANT_MAX_ITERATIONS", defaults.max_iterations)?,
                max_execution_time: Duration::from_secs(parsed(
                    &var,
                    "ASSISTANT_MAX_EXECUTION_SECS",
                    defaults.max_execution_time.as_secs(),
                )?),
            },
            sheets: SheetsConfig {
                spreadsheet_id: required("SHEET_ID")?,
                sheet: var("SHEET_RANGE").unwrap_or_else(|| "Sheet1".to_string()),
                credentials_path: var("GOOGLE_CREDENTIALS_PATH")
                    .map_or_else(|| PathBuf::from("credentials.json"), PathBuf::from),
                access_token: var("SHEETS_ACCESS_TOKEN"),
            },
            tools: ToolsConfig {
                knowledge_base_url: var("KNOWLEDGE_BASE_URL"),
                tavily_api_key: var("TAVILY_API_KEY"),
                timeout: Duration::from_secs(parsed(&var, "TOOL_TIMEOUT_SECS", 30)?),
            },
        })
    }
}

fn parsed<T: std::str::FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match var(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
