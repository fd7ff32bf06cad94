//! Ticket metrics for the support dashboard report.
//!
//! Computed from a full scan of the store; nothing here is incremental.

use crate::category::Category;
use crate::ticket::{Ticket, TicketId, TicketStatus};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Categories with fewer tickets than this are reported as low coverage
pub const LOW_COVERAGE_THRESHOLD: usize = 5;

/// Number of repeated contents listed in the report
pub const TOP_REPEATED: usize = 10;

/// Aggregate view over every ticket in the store
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TicketMetrics {
    /// All tickets
    pub total: usize,
    /// Tickets with status `closed`
    pub resolved: usize,
    /// Tickets with status `pending`
    pub unresolved: usize,
    /// Ticket count per stored status
    pub by_status: BTreeMap<String, usize>,
    /// Ticket count per category
    pub by_category: BTreeMap<Category, usize>,
    /// Pending ticket count per category
    pub pending_by_category: BTreeMap<Category, usize>,
    /// Pending tickets as (id, category, content), in store order
    pub pending: Vec<(TicketId, Category, String)>,
    /// Most frequent ticket contents, most frequent first
    pub top_contents: Vec<(String, usize)>,
    /// Categories present with fewer than [`LOW_COVERAGE_THRESHOLD`] tickets
    pub low_coverage: Vec<(Category, usize)>,
}

impl TicketMetrics {
    /// Aggregate a set of tickets
    #[must_use]
    pub fn from_tickets(tickets: &[Ticket]) -> Self {
        let mut metrics = Self {
            total: tickets.len(),
            ..Self::default()
        };
        let mut contents: HashMap<&str, usize> = HashMap::new();

        for ticket in tickets {
            match ticket.status {
                TicketStatus::Closed => metrics.resolved += 1,
                TicketStatus::Pending => {
                    metrics.unresolved += 1;
                    *metrics.pending_by_category.entry(ticket.category).or_default() += 1;
                    metrics
                        .pending
                        .push((ticket.id.clone(), ticket.category, ticket.content.clone()));
                }
                TicketStatus::Other(_) => {}
            }
            *metrics
                .by_status
                .entry(ticket.status.as_str().to_string())
                .or_default() += 1;
            *metrics.by_category.entry(ticket.category).or_default() += 1;
            *contents.entry(ticket.content.as_str()).or_default() += 1;
        }

        let mut top: Vec<(String, usize)> = contents
            .into_iter()
            .map(|(content, count)| (content.to_string(), count))
            .collect();
        top.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top.truncate(TOP_REPEATED);
        metrics.top_contents = top;

        metrics.low_coverage = metrics
            .by_category
            .iter()
            .filter(|(_, count)| **count < LOW_COVERAGE_THRESHOLD)
            .map(|(category, count)| (*category, *count))
            .collect();

        metrics
    }

    /// Share of tickets that are closed, as a percentage; 0 when empty
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Ticket counts are far below 2^52
    pub fn resolution_percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.resolved as f64 / self.total as f64 * 100.0
        }
    }
}

impl fmt::Display for TicketMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total tickets: {}", self.total)?;
        writeln!(f, "Resolved: {}", self.resolved)?;
        writeln!(f, "Unresolved: {}", self.unresolved)?;
        writeln!(f, "Resolution percentage: {:.2}%", self.resolution_percentage())?;

        writeln!(f, "By status:")?;
        for (status, count) in &self.by_status {
            writeln!(f, "- {status}: {count}")?;
        }
        writeln!(f, "By category:")?;
        for (category, count) in &self.by_category {
            writeln!(f, "- {category}: {count}")?;
        }
        if !self.pending_by_category.is_empty() {
            writeln!(f, "Pending by category:")?;
            for (category, count) in &self.pending_by_category {
                writeln!(f, "- {category}: {count}")?;
            }
        }
        if self.pending.is_empty() {
            writeln!(f, "No unresolved queries.")?;
        } else {
            writeln!(f, "Unresolved queries:")?;
            for (id, category, content) in &self.pending {
                writeln!(f, "- {id} ({category}): {content}")?;
            }
        }
        if !self.top_contents.is_empty() {
            writeln!(f, "Most repeated requests:")?;
            for (content, count) in &self.top_contents {
                writeln!(f, "- {content} ({count})")?;
            }
        }
        if self.low_coverage.is_empty() {
            write!(f, "All categories have sufficient coverage.")
        } else {
            let listed: Vec<String> = self
                .low_coverage
                .iter()
                .map(|(category, count)| format!("{category} ({count})"))
                .collect();
            write!(
                f,
                "Low coverage categories (<{LOW_COVERAGE_THRESHOLD}): {}",
                listed.join(", ")
            )
        }
    }
}
