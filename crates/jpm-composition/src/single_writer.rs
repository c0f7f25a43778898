//! Single writer composition strategy
//!
//! Default strategy: each value in a document has at most one writer per
//! run. Recipes are scheduled leaf edits first, structural edits next and
//! markers last; a recipe that would overwrite another recipe's value is
//! rejected for that document and reported.

use crate::ledger::Conflict;
use crate::recipe::Recipe;
use crate::strategy::{CompositionStrategy, Resolution};
use std::sync::Arc;

/// Single writer strategy: contested values are surfaced, never overwritten
///
/// # Characteristics
/// - Maximum safety (no silent precedence between recipes)
/// - Stable: recipes with equal precedence keep declaration order
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleWriterStrategy;

impl SingleWriterStrategy {
    /// Create new single writer strategy
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl CompositionStrategy for SingleWriterStrategy {
    fn schedule(&self, recipes: &[Arc<dyn Recipe>]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..recipes.len()).collect();
        order.sort_by_key(|&i| recipes[i].precedence());
        order
    }

    fn resolve(&self, conflicts: Vec<Conflict>) -> Resolution {
        if conflicts.is_empty() {
            Resolution::Accept
        } else {
            Resolution::Reject(conflicts)
        }
    }

    fn name(&self) -> &'static str {
        "single_writer"
    }
}
