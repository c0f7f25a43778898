//! Ordered composition strategy
//!
//! Recipes run exactly in the order they were given and later recipes win.

use crate::ledger::Conflict;
use crate::recipe::Recipe;
use crate::strategy::{CompositionStrategy, Resolution};
use std::sync::Arc;

/// Sequential refinement in declaration order
///
/// # Characteristics
/// - Later recipes see earlier results
/// - Last writer wins; overwritten values are still reported
/// - Use when the composition descriptor's order is deliberate
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderedCompositionStrategy;

impl OrderedCompositionStrategy {
    /// Create new ordered strategy
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl CompositionStrategy for OrderedCompositionStrategy {
    fn schedule(&self, recipes: &[Arc<dyn Recipe>]) -> Vec<usize> {
        (0..recipes.len()).collect()
    }

    fn resolve(&self, conflicts: Vec<Conflict>) -> Resolution {
        if conflicts.is_empty() {
            Resolution::Accept
        } else {
            Resolution::Overwrite(conflicts)
        }
    }

    fn name(&self) -> &'static str {
        "ordered"
    }
}
