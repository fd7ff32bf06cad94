//! Google Sheets ticket store
//!
//! Implements [`TicketStore`](ticket_assist_core::TicketStore) over the
//! Sheets v4 REST API. One worksheet holds the ticket table: row 1 is the
//! header, every following row is a ticket.
//!
//! ## Authentication
//!
//! - A service-account keyfile (`credentials.json`): a signed RS256 assertion
//!   is exchanged for a bearer token, cached until shortly before it expires
//! - A pre-issued bearer token, for local runs and tests
//!
//! ## Example
//!
//! ```no_run
//! use ticket_assist_sheets::{ServiceAccountKey, SheetsClient, SheetsTicketStore, TokenSource};
//!
//! # fn example() -> Result<(), ticket_assist_sheets::SheetsError> {
//! let key = ServiceAccountKey::from_file("credentials.json")?;
//! let client = SheetsClient::new("1AbC-spreadsheet-id", TokenSource::service_account(key));
//! let store = SheetsTicketStore::new(client, "Sheet1");
//! # let _ = store;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod store;

pub use auth::{ServiceAccountKey, TokenSource};
pub use client::SheetsClient;
pub use error::SheetsError;
pub use store::{column_letter, SheetsTicketStore};
