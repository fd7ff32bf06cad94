//! The closed set of ticket categories.
//!
//! Tickets are classified into exactly one of twenty labels. `Uncategorized`
//! is the fallback used when classification fails; it is never produced by a
//! successful categorization.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ticket category label
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Facility or equipment maintenance
    Maintenance,
    /// Help using a product
    ProductSupport,
    /// Refund request
    Refund,
    /// Urgent product issue
    HighPriorityProduct,
    /// Technical fault
    TechnicalIssue,
    /// New booking request
    NewBooking,
    /// Booking cancellation
    Cancellation,
    /// Change of date or time
    Reschedule,
    /// Seat change request
    SeatChange,
    /// Payment failure or dispute
    PaymentIssue,
    /// Discount or coupon not applied
    DiscountCouponIssue,
    /// Missing or unclear booking confirmation
    BookingConfirmation,
    /// Waitlist status question
    WaitlistEnquiry,
    /// Tatkal (short-notice) booking
    TatkalBooking,
    /// Accessibility or special assistance
    SpecialAssistance,
    /// Baggage and luggage
    BaggageLuggage,
    /// Travel passes
    TravelPasses,
    /// Group booking
    GroupBooking,
    /// Anything general
    GeneralEnquiry,
    /// Escalation requiring immediate attention
    HighPriorityEscalation,
    /// Fallback when no label could be assigned
    Uncategorized,
}

impl Category {
    /// The twenty labels a categorizer may return, in canonical order
    pub const LABELS: [Self; 20] = [
        Self::Maintenance,
        Self::ProductSupport,
        Self::Refund,
        Self::HighPriorityProduct,
        Self::TechnicalIssue,
        Self::NewBooking,
        Self::Cancellation,
        Self::Reschedule,
        Self::SeatChange,
        Self::PaymentIssue,
        Self::DiscountCouponIssue,
        Self::BookingConfirmation,
        Self::WaitlistEnquiry,
        Self::TatkalBooking,
        Self::SpecialAssistance,
        Self::BaggageLuggage,
        Self::TravelPasses,
        Self::GroupBooking,
        Self::GeneralEnquiry,
        Self::HighPriorityEscalation,
    ];

    /// Stored label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Maintenance => "maintenance",
            Self::ProductSupport => "product_support",
            Self::Refund => "refund",
            Self::HighPriorityProduct => "high_priority_product",
            Self::TechnicalIssue => "technical_issue",
            Self::NewBooking => "new_booking",
            Self::Cancellation => "cancellation",
            Self::Reschedule => "reschedule",
            Self::SeatChange => "seat_change",
            Self::PaymentIssue => "payment_issue",
            Self::DiscountCouponIssue => "discount_coupon_issue",
            Self::BookingConfirmation => "booking_confirmation",
            Self::WaitlistEnquiry => "waitlist_enquiry",
            Self::TatkalBooking => "tatkal_booking",
            Self::SpecialAssistance => "special_assistance",
            Self::BaggageLuggage => "baggage_luggage",
            Self::TravelPasses => "travel_passes",
            Self::GroupBooking => "group_booking",
            Self::GeneralEnquiry => "general_enquiry",
            Self::HighPriorityEscalation => "high_priority_escalation",
            Self::Uncategorized => "uncategorized",
        }
    }

    /// Comma-separated list of the twenty labels, for prompts
    #[must_use]
    pub fn label_list() -> String {
        Self::LABELS
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when text is not a known category label
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown category label: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Accepts labels case-insensitively, tolerating surrounding quotes,
    /// whitespace, a trailing period and spaces or hyphens in place of
    /// underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .trim()
            .trim_matches(|c| c == '"' || c == '\'' || c == '`')
            .trim_end_matches('.')
            .trim()
            .to_ascii_lowercase()
            .replace([' ', '-'], "_");

        Self::LABELS
            .iter()
            .copied()
            .chain(std::iter::once(Self::Uncategorized))
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
