//! Text classification into the closed category set.

use crate::category::Category;
use std::future::Future;
use thiserror::Error;

/// Errors from a categorization call
///
/// The repository never surfaces these to callers; any error means the
/// ticket is saved as `uncategorized`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CategorizeError {
    /// The classification service failed or was unreachable
    #[error("Categorizer unavailable: {0}")]
    Unavailable(String),

    /// The service answered with something that is not a known label
    #[error("Categorizer returned an unknown label: {0:?}")]
    UnknownLabel(String),
}

/// Maps free text to one of [`Category::LABELS`]
///
/// Implementations should be deterministic for a given input (for an LLM,
/// temperature 0).
pub trait Categorizer: Send + Sync {
    /// Classify ticket content
    ///
    /// # Errors
    ///
    /// Returns `CategorizeError` when the service fails or its answer does not
    /// parse as a label.
    fn categorize(
        &self,
        content: &str,
    ) -> impl Future<Output = Result<Category, CategorizeError>> + Send;
}

/// Parse a classifier's raw answer into one of the twenty labels
///
/// `uncategorized` is rejected: it is the fallback, not an answer.
///
/// # Errors
///
/// Returns `CategorizeError::UnknownLabel` when `answer` is not a label.
pub fn parse_label(answer: &str) -> Result<Category, CategorizeError> {
    match answer.parse::<Category>() {
        Ok(Category::Uncategorized) | Err(_) => {
            Err(CategorizeError::UnknownLabel(answer.trim().to_string()))
        }
        Ok(category) => Ok(category),
    }
}
