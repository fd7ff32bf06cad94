//! # Ticket Assist Core
//!
//! Ticket model and persistence layer for the ticket assistant.
//!
//! This crate owns the parts of the assistant that have to be right: ticket
//! ids, the closed category set, the in-process [`TicketCache`] and the
//! [`TicketRepository`] that reconciles it with an external tabular
//! [`TicketStore`]. The store and the [`Categorizer`] are traits; concrete
//! implementations live in other crates (Google Sheets, Claude) and in the
//! testing crate.
//!
//! ## Core Concepts
//!
//! - **Ticket**: support request keyed by a `TIC<digits>` id
//! - **Store**: row-oriented table with header-named columns, scanned linearly
//! - **Cache**: memo of tickets seen this session, never older than the last write
//! - **Repository**: `lookup`, `save`, `update_status` and `metrics`
//! - **Environment**: injected dependencies such as the [`Clock`]
//!
//! ## Example
//!
//! ```ignore
//! use ticket_assist_core::{TicketDraft, TicketRepository, environment::SystemClock};
//!
//! let repository = TicketRepository::new(store, categorizer, Arc::new(SystemClock));
//! let outcome = repository
//!     .save(TicketDraft {
//!         id: Some("TIC42".into()),
//!         content: Some("AC not working in coach B2".into()),
//!         created_by: Some("rider@example.com".into()),
//!         category: None,
//!     })
//!     .await?;
//! println!("{outcome}");
//! ```

pub mod agent;
pub mod cache;
pub mod categorizer;
pub mod category;
pub mod metrics;
pub mod repository;
pub mod store;
pub mod ticket;

pub use cache::{CacheError, TicketCache};
pub use categorizer::{CategorizeError, Categorizer};
pub use category::{Category, UnknownCategory};
pub use environment::Clock;
pub use metrics::TicketMetrics;
pub use repository::{Lookup, SaveOutcome, StatusUpdate, TicketError, TicketRepository};
pub use store::{ColumnLayout, StoreError, TicketStore};
pub use ticket::{Record, Ticket, TicketDraft, TicketField, TicketId, TicketStatus};

/// Environment module - Dependency injection traits
///
/// External dependencies that make behaviour non-deterministic are abstracted
/// behind traits and injected into the repository.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{DateTime, Utc};
    /// use ticket_assist_core::environment::Clock;
    ///
    /// // Test - fixed time for deterministic tests
    /// struct FixedClock { time: DateTime<Utc> }
    /// impl Clock for FixedClock {
    ///     fn now(&self) -> DateTime<Utc> {
    ///         self.time
    ///     }
    /// }
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Clone, Copy, Debug, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
