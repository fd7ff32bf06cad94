//! The tabular store that holds ticket rows.
//!
//! The store is row-oriented with header-named columns and no keyed access:
//! every lookup is a linear scan by the caller. Row numbers are 1-based sheet
//! rows, so the header is row 1 and the first record is row 2.

use crate::ticket::{columns, Record, Ticket};
use std::future::Future;
use thiserror::Error;

/// Sheet row holding the header
pub const HEADER_ROW: usize = 1;

/// Sheet row number of the record at `index` in `TicketStore::records`
#[must_use]
pub const fn row_number(index: usize) -> usize {
    index + HEADER_ROW + 1
}

/// Errors from store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or rejected the request
    #[error("Store unavailable: {0}")]
    Transport(String),

    /// Credentials were missing, invalid or expired
    #[error("Store authentication failed: {0}")]
    Auth(String),

    /// A required column is not in the header row
    #[error("Column '{0}' not found in header row")]
    MissingColumn(String),

    /// The store returned data that could not be interpreted
    #[error("Malformed store response: {0}")]
    Malformed(String),
}

/// Row-oriented ticket table
///
/// Implementations exist for Google Sheets and, for tests, an in-memory table.
pub trait TicketStore: Send + Sync {
    /// Read the header row (row 1); empty for a blank table
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be read.
    fn header(&self) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;

    /// Read every row below the header as a header-keyed record, in row order
    ///
    /// Blank rows are returned as records with empty values so that indices
    /// map to row numbers through [`row_number`].
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be read.
    fn records(&self) -> impl Future<Output = Result<Vec<Record>, StoreError>> + Send;

    /// Append a row after the last non-empty row
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write fails.
    fn append_row(&self, values: Vec<String>) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Overwrite row `row` starting at column 1
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write fails.
    fn update_row(
        &self,
        row: usize,
        values: Vec<String>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Overwrite the single cell at (`row`, `column`), both 1-based
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write fails.
    fn update_cell(
        &self,
        row: usize,
        column: usize,
        value: String,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Column positions resolved from a header row by name
///
/// Header names are matched trimmed and case-insensitively, so the table may
/// reorder columns or carry extra ones.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnLayout {
    header: Vec<String>,
}

impl ColumnLayout {
    /// Validate that `header` names every ticket column
    ///
    /// # Errors
    ///
    /// Returns `StoreError::MissingColumn` for the first ticket column absent
    /// from `header`.
    pub fn from_header(header: Vec<String>) -> Result<Self, StoreError> {
        let layout = Self { header };
        for column in columns::DEFAULT_HEADER {
            if layout.index_of(column).is_none() {
                return Err(StoreError::MissingColumn(column.to_string()));
            }
        }
        Ok(layout)
    }

    /// Layout of a freshly initialised table
    #[must_use]
    pub fn default_layout() -> Self {
        Self {
            header: columns::DEFAULT_HEADER.iter().map(ToString::to_string).collect(),
        }
    }

    /// Header cells in sheet order
    #[must_use]
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// 0-based index of `column`
    #[must_use]
    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.header
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(column))
    }

    /// 1-based column number of `column`, as used by `update_cell`
    #[must_use]
    pub fn column_number(&self, column: &str) -> Option<usize> {
        self.index_of(column).map(|i| i + 1)
    }

    /// Render `ticket` as a row in header order
    ///
    /// Columns that are not ticket fields keep their value from `existing`
    /// (the row being overwritten), or are left blank.
    #[must_use]
    pub fn render(&self, ticket: &Ticket, existing: Option<&Record>) -> Vec<String> {
        self.header
            .iter()
            .map(|name| {
                let key = name.trim().to_ascii_lowercase();
                ticket.column_value(&key).map_or_else(
                    || {
                        existing
                            .and_then(|record| record.get(name))
                            .cloned()
                            .unwrap_or_default()
                    },
                    str::to_string,
                )
            })
            .collect()
    }
}

/// Value of `column` in a record, matching header names like [`ColumnLayout`]
#[must_use]
pub fn record_value<'a>(record: &'a Record, column: &str) -> Option<&'a str> {
    record
        .iter()
        .find(|(name, _)| name.trim().eq_ignore_ascii_case(column))
        .map(|(_, value)| value.as_str())
}
