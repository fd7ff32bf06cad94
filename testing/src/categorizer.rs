//! Mock categorizers

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use ticket_assist_core::categorizer::{CategorizeError, Categorizer};
use ticket_assist_core::category::Category;

/// Always answers with one category, counting calls
#[derive(Clone, Debug)]
pub struct FixedCategorizer {
    category: Category,
    calls: Arc<AtomicUsize>,
}

impl FixedCategorizer {
    /// Categorizer that always returns `category`
    #[must_use]
    pub fn new(category: Category) -> Self {
        Self {
            category,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of `categorize` calls, shared across clones
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Categorizer for FixedCategorizer {
    async fn categorize(&self, _content: &str) -> Result<Category, CategorizeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.category)
    }
}

/// Always fails, as an unreachable classification service would
#[derive(Clone, Debug, Default)]
pub struct FailingCategorizer {
    calls: Arc<AtomicUsize>,
}

impl FailingCategorizer {
    /// Create a failing categorizer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `categorize` calls, shared across clones
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Categorizer for FailingCategorizer {
    async fn categorize(&self, _content: &str) -> Result<Category, CategorizeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CategorizeError::Unavailable("classification service offline".to_string()))
    }
}
