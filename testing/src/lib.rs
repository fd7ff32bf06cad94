//! # Ticket Assist Testing
//!
//! Testing utilities and helpers for the ticket assistant.
//!
//! This crate provides:
//! - [`InMemoryTicketStore`]: a row table with call counters and failure injection
//! - Mock categorizers with fixed or failing answers
//! - [`FixedClock`] for deterministic timestamps
//! - proptest strategies for ticket ids
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use ticket_assist_core::TicketRepository;
//! use ticket_assist_core::category::Category;
//! use ticket_assist_testing::{test_clock, FixedCategorizer, InMemoryTicketStore};
//!
//! # tokio_test_block_on(async {
//! let store = InMemoryTicketStore::with_default_header();
//! let repository = TicketRepository::new(
//!     store.clone(),
//!     FixedCategorizer::new(Category::Refund),
//!     Arc::new(test_clock()),
//! );
//!
//! let lookup = repository.lookup("where is TIC1?").await.unwrap();
//! assert_eq!(lookup.to_string(), "Ticket ID TIC1 not found in the sheet.");
//! assert_eq!(store.calls().record_reads, 1);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

mod categorizer;
mod store;

pub use categorizer::{FailingCategorizer, FixedCategorizer};
pub use store::{InMemoryTicketStore, StoreCalls};

use chrono::{DateTime, Utc};
use ticket_assist_core::environment::Clock;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use ticket_assist_testing::mocks::FixedClock;
    /// use ticket_assist_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Timestamp written by [`test_clock`], in the table's format
    pub const TEST_TIMESTAMP: &str = "2025-01-01 00:00:00";
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use proptest::prelude::*;

    /// Ticket ids in any letter case, e.g. `tIc042`
    pub fn any_case_ticket_id() -> impl Strategy<Value = String> {
        ("[tT][iI][cC]", "[0-9]{1,8}").prop_map(|(prefix, digits)| format!("{prefix}{digits}"))
    }

    /// Free text that cannot contain a ticket id
    pub fn text_without_ticket_id() -> impl Strategy<Value = String> {
        "[a-bd-su-z0-9 ,.?!]{0,48}"
    }
}

// Re-export commonly used items
pub use mocks::{test_clock, FixedClock, TEST_TIMESTAMP};

#[cfg(test)]
mod tests {
    use super::*;
    use ticket_assist_core::ticket::format_timestamp;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
    }

    #[test]
    fn test_timestamp_constant_matches_clock() {
        assert_eq!(format_timestamp(test_clock().now()), TEST_TIMESTAMP);
    }
}
