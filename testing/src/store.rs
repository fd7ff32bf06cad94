//! In-memory ticket table
//!
//! Behaves like a spreadsheet: row 1 is the header, writes address 1-based
//! rows and columns, and blank rows are kept. Every trait call is counted so
//! tests can assert on store traffic.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Panics only on a poisoned lock

use std::sync::{Arc, RwLock};
use std::time::Duration;
use ticket_assist_core::store::{StoreError, TicketStore};
use ticket_assist_core::ticket::{columns, Record};

/// Counts of store calls by kind
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoreCalls {
    /// `header` calls
    pub header_reads: usize,
    /// `records` calls
    pub record_reads: usize,
    /// `append_row` calls
    pub appends: usize,
    /// `update_row` calls
    pub row_updates: usize,
    /// `update_cell` calls
    pub cell_updates: usize,
}

impl StoreCalls {
    /// All read calls
    #[must_use]
    pub const fn reads(&self) -> usize {
        self.header_reads + self.record_reads
    }

    /// All write calls
    #[must_use]
    pub const fn writes(&self) -> usize {
        self.appends + self.row_updates + self.cell_updates
    }
}

#[derive(Debug, Default)]
struct Table {
    rows: Vec<Vec<String>>,
    calls: StoreCalls,
    fail_reads: Option<String>,
    fail_writes: Option<String>,
    ack_delay: Option<Duration>,
}

/// In-memory [`TicketStore`] for fast, deterministic tests
///
/// Clones share the same table, so a test can keep a handle after moving
/// the store into a repository.
///
/// # Example
///
/// ```
/// use ticket_assist_testing::InMemoryTicketStore;
///
/// let store = InMemoryTicketStore::with_default_header()
///     .with_row(&["TIC1", "Seat broken", "maintenance", "2025-01-01 00:00:00", "a@b.com", "pending"]);
/// assert_eq!(store.row_count(), 1);
/// assert_eq!(store.cell(2, "ticket_status").as_deref(), Some("pending"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryTicketStore {
    table: Arc<RwLock<Table>>,
}

impl InMemoryTicketStore {
    /// Create a blank table with no header
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table whose header is the default ticket columns
    #[must_use]
    pub fn with_default_header() -> Self {
        Self::with_header(&columns::DEFAULT_HEADER)
    }

    /// Create a table with a custom header row
    #[must_use]
    pub fn with_header(header: &[&str]) -> Self {
        let store = Self::new();
        store.table.write().unwrap().rows.push(to_row(header));
        store
    }

    /// Add a row below the existing ones (builder form, not counted)
    #[must_use]
    pub fn with_row(self, values: &[&str]) -> Self {
        self.table.write().unwrap().rows.push(to_row(values));
        self
    }

    /// Header row, empty when the table is blank
    #[must_use]
    pub fn header_row(&self) -> Vec<String> {
        self.table.read().unwrap().rows.first().cloned().unwrap_or_default()
    }

    /// All rows below the header
    #[must_use]
    pub fn data_rows(&self) -> Vec<Vec<String>> {
        self.table.read().unwrap().rows.iter().skip(1).cloned().collect()
    }

    /// Number of rows below the header
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.table.read().unwrap().rows.len().saturating_sub(1)
    }

    /// Value at 1-based sheet row `row` under header `column`
    #[must_use]
    pub fn cell(&self, row: usize, column: &str) -> Option<String> {
        let table = self.table.read().unwrap();
        let header = table.rows.first()?;
        let index = header
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(column))?;
        table
            .rows
            .get(row.checked_sub(1)?)
            .map(|r| r.get(index).cloned().unwrap_or_default())
    }

    /// Call counts so far
    #[must_use]
    pub fn calls(&self) -> StoreCalls {
        self.table.read().unwrap().calls
    }

    /// Zero the call counters
    pub fn reset_calls(&self) {
        self.table.write().unwrap().calls = StoreCalls::default();
    }

    /// Make every read fail with a transport error
    pub fn fail_reads(&self, message: impl Into<String>) {
        self.table.write().unwrap().fail_reads = Some(message.into());
    }

    /// Make every write fail with a transport error
    pub fn fail_writes(&self, message: impl Into<String>) {
        self.table.write().unwrap().fail_writes = Some(message.into());
    }

    /// Apply every write at once but acknowledge it only after `delay`
    ///
    /// Models a remote store whose reply is still in flight when the caller
    /// gives up.
    pub fn slow_writes(&self, delay: Duration) {
        self.table.write().unwrap().ack_delay = Some(delay);
    }

    async fn acknowledge(delay: Option<Duration>) {
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn read_failure(table: &Table) -> Result<(), StoreError> {
        table
            .fail_reads
            .as_ref()
            .map_or(Ok(()), |m| Err(StoreError::Transport(m.clone())))
    }

    fn write_failure(table: &Table) -> Result<(), StoreError> {
        table
            .fail_writes
            .as_ref()
            .map_or(Ok(()), |m| Err(StoreError::Transport(m.clone())))
    }
}

impl TicketStore for InMemoryTicketStore {
    async fn header(&self) -> Result<Vec<String>, StoreError> {
        let mut table = self.table.write().unwrap();
        table.calls.header_reads += 1;
        Self::read_failure(&table)?;
        Ok(table.rows.first().cloned().unwrap_or_default())
    }

    async fn records(&self) -> Result<Vec<Record>, StoreError> {
        let mut table = self.table.write().unwrap();
        table.calls.record_reads += 1;
        Self::read_failure(&table)?;

        let Some((header, rows)) = table.rows.split_first() else {
            return Ok(Vec::new());
        };
        Ok(rows
            .iter()
            .map(|row| {
                header
                    .iter()
                    .enumerate()
                    .map(|(i, name)| (name.clone(), row.get(i).cloned().unwrap_or_default()))
                    .collect()
            })
            .collect())
    }

    async fn append_row(&self, values: Vec<String>) -> Result<(), StoreError> {
        let delay = {
            let mut table = self.table.write().unwrap();
            table.calls.appends += 1;
            Self::write_failure(&table)?;
            table.rows.push(values);
            table.ack_delay
        };
        Self::acknowledge(delay).await;
        Ok(())
    }

    async fn update_row(&self, row: usize, values: Vec<String>) -> Result<(), StoreError> {
        let delay = {
            let mut table = self.table.write().unwrap();
            table.calls.row_updates += 1;
            Self::write_failure(&table)?;

            let target = row_mut(&mut table.rows, row)?;
            if target.len() < values.len() {
                target.resize(values.len(), String::new());
            }
            for (cell, value) in target.iter_mut().zip(values) {
                *cell = value;
            }
            table.ack_delay
        };
        Self::acknowledge(delay).await;
        Ok(())
    }

    async fn update_cell(&self, row: usize, column: usize, value: String) -> Result<(), StoreError> {
        let delay = {
            let mut table = self.table.write().unwrap();
            table.calls.cell_updates += 1;
            Self::write_failure(&table)?;

            let index = column
                .checked_sub(1)
                .ok_or_else(|| StoreError::Malformed("column 0 is not addressable".to_string()))?;
            let target = row_mut(&mut table.rows, row)?;
            if target.len() <= index {
                target.resize(index + 1, String::new());
            }
            target[index] = value;
            table.ack_delay
        };
        Self::acknowledge(delay).await;
        Ok(())
    }
}

fn row_mut(rows: &mut Vec<Vec<String>>, row: usize) -> Result<&mut Vec<String>, StoreError> {
    let index = row
        .checked_sub(1)
        .ok_or_else(|| StoreError::Malformed("row 0 is not addressable".to_string()))?;
    if rows.len() <= index {
        rows.resize(index + 1, Vec::new());
    }
    Ok(&mut rows[index])
}

fn to_row(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}
