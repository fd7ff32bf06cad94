//! Ticket persistence over a [`TicketStore`] with a session cache.
//!
//! The repository is the only writer of both the store and the cache. A
//! ticket is evicted from the cache before its row is written and put back
//! once the write is acknowledged, so a cached ticket is never older than the
//! last write to it, even when the caller drops the future mid-write.
//!
//! Existence checks are a linear scan over all records followed by a write;
//! the pair is not atomic. That is acceptable for a single-user assistant and
//! would need per-id exclusion and conditional writes for anything else.

use crate::cache::{CacheError, TicketCache};
use crate::categorizer::Categorizer;
use crate::category::Category;
use crate::environment::Clock;
use crate::metrics::TicketMetrics;
use crate::store::{row_number, record_value, ColumnLayout, StoreError, TicketStore};
use crate::ticket::{
    columns, format_timestamp, Record, Ticket, TicketDraft, TicketField, TicketId, TicketStatus,
};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

/// Errors from repository operations
#[derive(Debug, Error)]
pub enum TicketError {
    /// A required draft field was absent or blank
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The supplied id is not `TIC` followed by digits
    #[error("Invalid ticket ID: '{0}'")]
    InvalidId(String),

    /// The store failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The cache rejected an update
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Result of a lookup
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lookup {
    /// No ticket id appears in the query
    InvalidId(String),
    /// The ticket exists
    Found(Ticket),
    /// The id is well-formed but no row carries it
    NotFound(TicketId),
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId(raw) => write!(f, "Could not find a valid ticket ID in: {raw}"),
            Self::Found(ticket) => write!(f, "{ticket}"),
            Self::NotFound(id) => write!(f, "Ticket ID {id} not found in the sheet."),
        }
    }
}

/// Result of a save
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A new row was appended
    Created {
        /// Saved id
        id: TicketId,
        /// Category written
        category: Category,
    },
    /// An existing row was overwritten
    Updated {
        /// Saved id
        id: TicketId,
        /// Category written
        category: Category,
    },
}

impl fmt::Display for SaveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created { id, category } => {
                write!(f, "Ticket '{id}' saved successfully (category: {category}).")
            }
            Self::Updated { id, category } => {
                write!(f, "Ticket '{id}' updated successfully (category: {category}).")
            }
        }
    }
}

/// Result of a status update
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StatusUpdate {
    /// The status cell was written
    Updated {
        /// Updated id
        id: TicketId,
        /// Status written
        status: TicketStatus,
    },
    /// No row carries the id; nothing was written
    NotFound(TicketId),
}

impl fmt::Display for StatusUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Updated { id, status } => {
                write!(f, "Ticket '{id}' status updated to '{status}'.")
            }
            Self::NotFound(id) => write!(f, "Ticket ID '{id}' not found."),
        }
    }
}

/// Ticket operations over a store, a categorizer and a clock
pub struct TicketRepository<S, C> {
    store: S,
    categorizer: C,
    clock: Arc<dyn Clock>,
    cache: RwLock<TicketCache>,
}

impl<S, C> fmt::Debug for TicketRepository<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TicketRepository")
            .field("cached", &self.read_cache().len())
            .finish_non_exhaustive()
    }
}

impl<S: TicketStore, C: Categorizer> TicketRepository<S, C> {
    /// Create a repository with an empty cache
    #[must_use]
    pub fn new(store: S, categorizer: C, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            categorizer,
            clock,
            cache: RwLock::new(TicketCache::new()),
        }
    }

    /// The underlying store
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Cached copy of a ticket, without touching the store
    #[must_use]
    pub fn cached(&self, id: &TicketId) -> Option<Ticket> {
        self.read_cache().get(id).cloned()
    }

    /// Drop a cached ticket so the next lookup reads the store
    pub fn invalidate(&self, id: &TicketId) -> Option<Ticket> {
        self.write_cache().invalidate(id)
    }

    /// Find a ticket by an id mentioned anywhere in `raw`
    ///
    /// Cached tickets are answered without reading the store.
    ///
    /// # Errors
    ///
    /// Returns `TicketError::Store` if the store cannot be read.
    pub async fn lookup(&self, raw: &str) -> Result<Lookup, TicketError> {
        let Some(id) = TicketId::extract(raw) else {
            tracing::debug!(query = raw, "No ticket id in lookup query");
            return Ok(Lookup::InvalidId(raw.to_string()));
        };

        if let Some(ticket) = self.cached(&id) {
            tracing::debug!(ticket_id = %id, "Lookup served from cache");
            return Ok(Lookup::Found(ticket));
        }

        let records = self.store.records().await?;
        let Some(ticket) = find_record(&records, &id).and_then(|(_, r)| Ticket::from_record(r))
        else {
            tracing::info!(ticket_id = %id, "Ticket not found");
            return Ok(Lookup::NotFound(id));
        };

        self.write_cache().put(id, ticket.clone());
        Ok(Lookup::Found(ticket))
    }

    /// Create or overwrite a ticket
    ///
    /// A missing or unknown category is classified from the content, falling
    /// back to `uncategorized`. An existing ticket keeps its status; a new one
    /// starts `pending`.
    ///
    /// # Errors
    ///
    /// Returns `TicketError::MissingField` or `TicketError::InvalidId` for an
    /// incomplete draft (before any store access), and `TicketError::Store`
    /// if the store fails.
    pub async fn save(&self, draft: TicketDraft) -> Result<SaveOutcome, TicketError> {
        let TicketDraft {
            id: raw_id,
            content,
            created_by,
            category,
        } = draft;
        let raw_id = required(raw_id.as_deref(), columns::ID)?;
        let content = required(content.as_deref(), columns::CONTENT)?.to_string();
        let created_by = required(created_by.as_deref(), columns::CREATED_BY)?.to_string();
        let id = TicketId::parse(raw_id).ok_or_else(|| TicketError::InvalidId(raw_id.to_string()))?;

        let category = match supplied_category(category.as_deref()) {
            Some(category) => category,
            None => self.categorize(&content).await,
        };
        let timestamp = format_timestamp(self.clock.now());

        let header = self.store.header().await?;
        let (layout, records) = if header.is_empty() {
            let layout = ColumnLayout::default_layout();
            tracing::info!("Initialising empty ticket table with default header");
            self.store.append_row(layout.header().to_vec()).await?;
            (layout, Vec::new())
        } else {
            (ColumnLayout::from_header(header)?, self.store.records().await?)
        };

        let existing = find_record(&records, &id);
        let status = match existing {
            Some((_, record)) => self.prior_status(&id, record),
            None => TicketStatus::Pending,
        };
        let ticket = Ticket {
            id: id.clone(),
            content,
            category,
            timestamp,
            created_by,
            status,
        };

        self.write_cache().invalidate(&id);
        let outcome = match existing {
            Some((index, record)) => {
                let row = layout.render(&ticket, Some(record));
                self.store.update_row(row_number(index), row).await?;
                SaveOutcome::Updated {
                    id: id.clone(),
                    category,
                }
            }
            None => {
                let row = layout.render(&ticket, None);
                self.store.append_row(row).await?;
                SaveOutcome::Created {
                    id: id.clone(),
                    category,
                }
            }
        };

        tracing::info!(ticket_id = %id, category = %category, status = %ticket.status, "Ticket saved");
        self.write_cache().put(id, ticket);
        Ok(outcome)
    }

    /// Set a ticket's status from `"ID"` or `"ID, status"`
    ///
    /// A missing or blank status means `pending`. Only the status cell is
    /// written.
    ///
    /// # Errors
    ///
    /// Returns `TicketError::InvalidId` if the id part is not a ticket id
    /// (before any store access), `TicketError::Store` if the store fails.
    pub async fn update_status(&self, raw: &str) -> Result<StatusUpdate, TicketError> {
        let (raw_id, raw_status) = raw.split_once(',').unwrap_or((raw, ""));
        let id = TicketId::parse(raw_id)
            .ok_or_else(|| TicketError::InvalidId(raw_id.trim().to_string()))?;
        let status = TicketStatus::from(raw_status);

        let header = self.store.header().await?;
        if header.is_empty() {
            return Ok(StatusUpdate::NotFound(id));
        }
        let layout = ColumnLayout::from_header(header)?;
        let records = self.store.records().await?;

        let Some((index, record)) = find_record(&records, &id) else {
            tracing::info!(ticket_id = %id, "Status update for unknown ticket");
            return Ok(StatusUpdate::NotFound(id));
        };
        let column = layout
            .column_number(columns::STATUS)
            .ok_or_else(|| StoreError::MissingColumn(columns::STATUS.to_string()))?;

        let cached = self.write_cache().invalidate(&id);
        self.store
            .update_cell(row_number(index), column, status.as_str().to_string())
            .await?;

        if let Some(ticket) = cached.or_else(|| Ticket::from_record(record)) {
            let mut cache = self.write_cache();
            cache.put(id.clone(), ticket);
            cache.update_field(&id, TicketField::Status, status.as_str())?;
        }

        tracing::info!(ticket_id = %id, status = %status, "Ticket status updated");
        Ok(StatusUpdate::Updated { id, status })
    }

    /// Aggregate metrics over every ticket in the store
    ///
    /// The scan also refreshes the cache with the tickets it read.
    ///
    /// # Errors
    ///
    /// Returns `TicketError::Store` if the store cannot be read.
    pub async fn metrics(&self) -> Result<TicketMetrics, TicketError> {
        let records = self.store.records().await?;
        let tickets: Vec<Ticket> = records.iter().filter_map(Ticket::from_record).collect();

        {
            let mut cache = self.write_cache();
            for ticket in &tickets {
                cache.put(ticket.id.clone(), ticket.clone());
            }
        }

        tracing::debug!(tickets = tickets.len(), "Computed ticket metrics");
        Ok(TicketMetrics::from_tickets(&tickets))
    }

    async fn categorize(&self, content: &str) -> Category {
        match self.categorizer.categorize(content).await {
            Ok(category) => category,
            Err(err) => {
                tracing::warn!(error = %err, "Categorization failed, using fallback");
                Category::Uncategorized
            }
        }
    }

    fn prior_status(&self, id: &TicketId, record: &Record) -> TicketStatus {
        self.cached(id).map_or_else(
            || {
                record_value(record, columns::STATUS)
                    .map(TicketStatus::from)
                    .unwrap_or_default()
            },
            |ticket| ticket.status,
        )
    }
}

impl<S, C> TicketRepository<S, C> {
    fn read_cache(&self) -> RwLockReadGuard<'_, TicketCache> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, TicketCache> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, TicketError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(TicketError::MissingField(field))
}

fn supplied_category(raw: Option<&str>) -> Option<Category> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<Category>() {
        Ok(category) => Some(category),
        Err(err) => {
            tracing::debug!(error = %err, "Ignoring unknown category from caller");
            None
        }
    }
}

/// Position and contents of the first record whose id matches
fn find_record<'a>(records: &'a [Record], id: &TicketId) -> Option<(usize, &'a Record)> {
    records.iter().enumerate().find(|(_, record)| {
        record_value(record, columns::ID)
            .and_then(TicketId::parse)
            .is_some_and(|found| &found == id)
    })
}
