//! # Anthropic Messages API Client
//!
//! Minimal client for the Anthropic Messages API as used by the ticket
//! assistant: plain completions for the categorizer and tool-use turns for
//! the conversational agent.
//!
//! ## Example
//!
//! ```no_run
//! use ticket_assist_anthropic::{AnthropicClient, MessagesRequest};
//! use ticket_assist_anthropic::types::Message;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = AnthropicClient::from_env()?;
//!
//!     let request = MessagesRequest::new(vec![Message::user("Where is my refund?")])
//!         .with_temperature(0.0);
//!
//!     let response = client.messages(request).await?;
//!     println!("{}", response.text());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod messages;
pub mod types;

pub use client::AnthropicClient;
pub use error::ClaudeError;
pub use messages::{MessagesRequest, MessagesResponse, DEFAULT_MODEL};
pub use types::{ContentBlock, Message, Role, StopReason, Tool, Usage};
