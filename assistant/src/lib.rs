//! Interactive support-ticket assistant
//!
//! A chat agent that answers travel support questions from a knowledge base,
//! looks up, raises and updates tickets held in a Google Sheet, and reports
//! ticket metrics.
//!
//! # Architecture
//!
//! ```text
//!   stdin ──► session ──► Agent ──► Anthropic Messages API
//!                           │
//!                           ▼
//!                      ToolRegistry
//!          ┌────────────┬───┴──────────┬──────────────┐
//!          ▼            ▼              ▼              ▼
//!     ticket tools  knowledge_base  web_search   (retry/timeout)
//!          │
//!          ▼
//!   TicketRepository ──► TicketCache
//!          │
//!          ├──► SheetsTicketStore ──► Sheets v4 API
//!          └──► LlmCategorizer   ──► Anthropic Messages API
//! ```

pub mod agent;
pub mod bootstrap;
pub mod categorizer;
pub mod config;
pub mod metrics;
pub mod session;

pub use agent::{Agent, AgentConfig, AgentError};
pub use categorizer::LlmCategorizer;
pub use config::{Config, ConfigError};
