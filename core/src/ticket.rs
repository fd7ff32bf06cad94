//! Ticket records and their identifiers.

use crate::category::Category;
use crate::store::record_value;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

/// Format of `ticket_timestamp` values
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Placeholder rendered for fields missing from a store row
pub const MISSING_FIELD: &str = "N/A";

/// Column headers of the ticket table
pub mod columns {
    /// Ticket identifier
    pub const ID: &str = "ticket_id";
    /// Free-text content
    pub const CONTENT: &str = "ticket_content";
    /// Category label
    pub const CATEGORY: &str = "ticket_category";
    /// Last write time
    pub const TIMESTAMP: &str = "ticket_timestamp";
    /// Submitter
    pub const CREATED_BY: &str = "ticket_by";
    /// Status
    pub const STATUS: &str = "ticket_status";

    /// Header written to an empty table, in this order
    pub const DEFAULT_HEADER: [&str; 6] = [ID, CONTENT, CATEGORY, TIMESTAMP, CREATED_BY, STATUS];
}

/// A store row keyed by header name
pub type Record = BTreeMap<String, String>;

#[allow(clippy::expect_used)] // Literal pattern, checked by tests
static EMBEDDED_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bTIC[0-9]+\b").expect("ticket id pattern is valid"));

#[allow(clippy::expect_used)] // Literal pattern, checked by tests
static EXACT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^TIC[0-9]+$").expect("ticket id pattern is valid"));

/// Canonical (uppercase) ticket identifier, `TIC` followed by digits
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TicketId(String);

impl TicketId {
    /// Parse a string that is exactly one ticket id (surrounding whitespace allowed)
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        EXACT_ID
            .is_match(trimmed)
            .then(|| Self(trimmed.to_ascii_uppercase()))
    }

    /// Find the first whole-word ticket id anywhere in free text
    ///
    /// ```
    /// use ticket_assist_core::TicketId;
    ///
    /// let id = TicketId::extract("what happened to tic42?").unwrap();
    /// assert_eq!(id.as_str(), "TIC42");
    /// assert!(TicketId::extract("order XTIC42").is_none());
    /// ```
    #[must_use]
    pub fn extract(text: &str) -> Option<Self> {
        EMBEDDED_ID
            .find(text)
            .map(|m| Self(m.as_str().to_ascii_uppercase()))
    }

    /// The canonical id
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TicketId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid ticket id: {value}"))
    }
}

impl From<TicketId> for String {
    fn from(id: TicketId) -> Self {
        id.0
    }
}

/// Ticket lifecycle status, stored lowercase
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TicketStatus {
    /// Awaiting resolution
    #[default]
    Pending,
    /// Resolved
    Closed,
    /// Any other status an operator has written
    Other(String),
}

impl TicketStatus {
    /// Stored form
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Closed => "closed",
            Self::Other(s) => s,
        }
    }
}

impl From<&str> for TicketStatus {
    /// Lowercases and trims; blank input means `Pending`.
    fn from(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase();
        match normalized.as_str() {
            "" | "pending" => Self::Pending,
            "closed" => Self::Closed,
            _ => Self::Other(normalized),
        }
    }
}

impl From<String> for TicketStatus {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<TicketStatus> for String {
    fn from(status: TicketStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted ticket
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Primary key
    pub id: TicketId,
    /// Issue description
    pub content: String,
    /// Assigned label
    pub category: Category,
    /// Time of the last write, `YYYY-MM-DD HH:MM:SS`
    pub timestamp: String,
    /// Submitter identity
    pub created_by: String,
    /// Lifecycle status
    pub status: TicketStatus,
}

impl Ticket {
    /// Build a ticket from a store row
    ///
    /// Returns `None` when the row has no parsable `ticket_id` (blank or
    /// hand-edited rows). Other missing fields render as `N/A`; an
    /// unrecognised category label reads as `uncategorized`.
    #[must_use]
    pub fn from_record(record: &Record) -> Option<Self> {
        let id = TicketId::parse(record_value(record, columns::ID)?)?;
        let field = |name: &str| {
            record_value(record, name)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map_or_else(|| MISSING_FIELD.to_string(), str::to_string)
        };

        let category = match record_value(record, columns::CATEGORY)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::parse::<Category>)
        {
            Some(Ok(category)) => category,
            Some(Err(err)) => {
                tracing::warn!(ticket_id = %id, error = %err, "Store row has an unrecognised category");
                Category::Uncategorized
            }
            None => Category::Uncategorized,
        };

        Some(Self {
            content: field(columns::CONTENT),
            category,
            timestamp: field(columns::TIMESTAMP),
            created_by: field(columns::CREATED_BY),
            status: record_value(record, columns::STATUS)
                .map(TicketStatus::from)
                .unwrap_or_default(),
            id,
        })
    }

    /// Value of a named column for this ticket, if the column is a ticket field
    #[must_use]
    pub fn column_value(&self, column: &str) -> Option<&str> {
        match column {
            columns::ID => Some(self.id.as_str()),
            columns::CONTENT => Some(&self.content),
            columns::CATEGORY => Some(self.category.as_str()),
            columns::TIMESTAMP => Some(&self.timestamp),
            columns::CREATED_BY => Some(&self.created_by),
            columns::STATUS => Some(self.status.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ticket {} ({}) was created by {} on {}. Status: {}. Content: {}",
            self.id, self.category, self.created_by, self.timestamp, self.status, self.content
        )
    }
}

/// Caller-supplied fields for a save
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketDraft {
    /// Ticket id as typed by the caller
    #[serde(default, alias = "ticket_id")]
    pub id: Option<String>,
    /// Issue description
    #[serde(default)]
    pub content: Option<String>,
    /// Submitter identity
    #[serde(default, alias = "user_email")]
    pub created_by: Option<String>,
    /// Optional category label; classified automatically when absent
    #[serde(default)]
    pub category: Option<String>,
}

/// Mutable fields of a cached ticket
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TicketField {
    /// `ticket_content`
    Content,
    /// `ticket_category`
    Category,
    /// `ticket_timestamp`
    Timestamp,
    /// `ticket_by`
    CreatedBy,
    /// `ticket_status`
    Status,
}

impl TicketField {
    /// Column header for this field
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Content => columns::CONTENT,
            Self::Category => columns::CATEGORY,
            Self::Timestamp => columns::TIMESTAMP,
            Self::CreatedBy => columns::CREATED_BY,
            Self::Status => columns::STATUS,
        }
    }
}

/// Render a write time in the table's timestamp format
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_extract_finds_embedded_id() {
        let id = TicketId::extract("Can you check ticket tic0042 for me?").unwrap();
        assert_eq!(id.as_str(), "TIC0042");
    }

    #[test]
    fn test_extract_requires_word_boundaries() {
        assert!(TicketId::extract("ABCTIC12").is_none());
        assert!(TicketId::extract("TIC12X").is_none());
        assert!(TicketId::extract("TIC").is_none());
        assert!(TicketId::extract("").is_none());
    }

    #[test]
    fn test_extract_takes_first_match() {
        let id = TicketId::extract("merge TIC7 into TIC8").unwrap();
        assert_eq!(id.as_str(), "TIC7");
    }

    #[test]
    fn test_parse_is_exact() {
        assert_eq!(TicketId::parse(" tic5 ").unwrap().as_str(), "TIC5");
        assert!(TicketId::parse("TIC5 please").is_none());
        assert!(TicketId::parse("TICX").is_none());
    }

    #[test]
    fn test_status_normalization() {
        assert_eq!(TicketStatus::from(" CLOSED "), TicketStatus::Closed);
        assert_eq!(TicketStatus::from(""), TicketStatus::Pending);
        assert_eq!(
            TicketStatus::from("On Hold"),
            TicketStatus::Other("on hold".to_string())
        );
    }

    #[test]
    fn test_from_record_fills_missing_fields() {
        let ticket = Ticket::from_record(&record(&[
            ("ticket_id", "tic9"),
            ("ticket_content", "Seat broken"),
            ("ticket_category", "maintenance"),
        ]))
        .unwrap();

        assert_eq!(ticket.id.as_str(), "TIC9");
        assert_eq!(ticket.category, Category::Maintenance);
        assert_eq!(ticket.created_by, MISSING_FIELD);
        assert_eq!(ticket.timestamp, MISSING_FIELD);
        assert_eq!(ticket.status, TicketStatus::Pending);
    }

    #[test]
    fn test_from_record_skips_rows_without_id() {
        assert!(Ticket::from_record(&record(&[("ticket_id", "")])).is_none());
        assert!(Ticket::from_record(&record(&[("ticket_content", "x")])).is_none());
    }

    #[test]
    fn test_display_matches_lookup_format() {
        let ticket = Ticket {
            id: TicketId::parse("TIC1").unwrap(),
            content: "Refund not received".to_string(),
            category: Category::Refund,
            timestamp: "2025-01-01 00:00:00".to_string(),
            created_by: "a@b.com".to_string(),
            status: TicketStatus::Pending,
        };

        assert_eq!(
            ticket.to_string(),
            "Ticket TIC1 (refund) was created by a@b.com on 2025-01-01 00:00:00. \
             Status: pending. Content: Refund not received"
        );
    }

    #[test]
    fn test_draft_accepts_tool_field_aliases() {
        let draft: TicketDraft = serde_json::from_str(
            r#"{"ticket_id": "TIC3", "content": "Lost bag", "user_email": "c@d.com"}"#,
        )
        .unwrap();

        assert_eq!(draft.id.as_deref(), Some("TIC3"));
        assert_eq!(draft.created_by.as_deref(), Some("c@d.com"));
        assert!(draft.category.is_none());
    }

    proptest! {
        #[test]
        fn prop_extract_canonicalizes_any_case(digits in "[0-9]{1,9}", prefix in "(tic|TIC|Tic|tIc)") {
            let text = format!("please look at {prefix}{digits} today");
            let id = TicketId::extract(&text).unwrap();
            prop_assert_eq!(id.as_str(), format!("TIC{digits}"));
        }

        #[test]
        fn prop_text_without_tic_never_matches(text in "[a-su-z0-9 ,.!?]{0,64}") {
            prop_assert!(TicketId::extract(&text).is_none());
        }
    }
}
