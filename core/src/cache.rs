//! In-process memo of tickets already seen this session.
//!
//! The cache is unbounded and never expires: ticket volume for a session is
//! assumed to fit in memory. It is owned by the repository, which keeps every
//! entry in step with the last acknowledged write to the store.

use crate::category::Category;
use crate::ticket::{Ticket, TicketField, TicketId, TicketStatus};
use std::collections::HashMap;
use thiserror::Error;

/// Errors from cache mutation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// `update_field` on an id with no entry
    #[error("Ticket {0} is not cached")]
    NotCached(TicketId),

    /// The value cannot be stored in the requested field
    #[error("Invalid value for {field}: {value}")]
    InvalidValue {
        /// Column of the rejected field
        field: &'static str,
        /// Rejected value
        value: String,
    },
}

/// Ticket cache keyed by canonical id
#[derive(Clone, Debug, Default)]
pub struct TicketCache {
    entries: HashMap<TicketId, Ticket>,
}

impl TicketCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached copy of a ticket
    #[must_use]
    pub fn get(&self, id: &TicketId) -> Option<&Ticket> {
        self.entries.get(id)
    }

    /// Whether an entry exists for `id`
    #[must_use]
    pub fn contains(&self, id: &TicketId) -> bool {
        self.entries.contains_key(id)
    }

    /// Insert or replace the entry for `id`
    pub fn put(&mut self, id: TicketId, ticket: Ticket) {
        self.entries.insert(id, ticket);
    }

    /// Overwrite one field of an existing entry
    ///
    /// # Errors
    ///
    /// Returns `CacheError::NotCached` when `id` has no entry, and
    /// `CacheError::InvalidValue` when a category value is not a known label.
    pub fn update_field(
        &mut self,
        id: &TicketId,
        field: TicketField,
        value: impl Into<String>,
    ) -> Result<(), CacheError> {
        let ticket = self
            .entries
            .get_mut(id)
            .ok_or_else(|| CacheError::NotCached(id.clone()))?;
        let value = value.into();

        match field {
            TicketField::Content => ticket.content = value,
            TicketField::Timestamp => ticket.timestamp = value,
            TicketField::CreatedBy => ticket.created_by = value,
            TicketField::Status => ticket.status = TicketStatus::from(value),
            TicketField::Category => {
                ticket.category =
                    value
                        .parse::<Category>()
                        .map_err(|_| CacheError::InvalidValue {
                            field: field.column(),
                            value,
                        })?;
            }
        }
        Ok(())
    }

    /// Drop the entry for `id`, returning it
    pub fn invalidate(&mut self, id: &TicketId) -> Option<Ticket> {
        self.entries.remove(id)
    }

    /// Number of cached tickets
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
