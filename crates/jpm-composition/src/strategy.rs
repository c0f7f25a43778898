//! Composition strategy trait and core types
//!
//! A [`CompositionStrategy`] decides two things for the recipes that run
//! over one document: in which order they run, and what happens when a
//! recipe's edits collide with edits an earlier recipe already made.

use crate::ledger::Conflict;
use crate::recipe::Recipe;
use std::sync::Arc;

/// Scheduling and conflict policy for recipes on one document
///
/// Implementations must be deterministic: the same recipes and the same
/// conflicts always yield the same schedule and resolution.
pub trait CompositionStrategy: Send + Sync + std::fmt::Debug {
    /// Order in which to run `recipes`, as indices into the slice
    fn schedule(&self, recipes: &[Arc<dyn Recipe>]) -> Vec<usize>;

    /// What to do with a recipe whose edits collide with earlier claims
    fn resolve(&self, conflicts: Vec<Conflict>) -> Resolution;

    /// Strategy name (for configuration and logs)
    fn name(&self) -> &'static str;
}

/// Decision for a recipe result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No collision, keep the result
    Accept,
    /// Keep the result; the listed earlier values are overwritten
    Overwrite(Vec<Conflict>),
    /// Drop the result; the document stays as the earlier recipes left it
    Reject(Vec<Conflict>),
}

impl Resolution {
    /// Whether the recipe's document is kept
    #[inline]
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Self::Reject(_))
    }
}

/// Composition error with diagnostics
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompositionError {
    /// Requested strategy is not registered
    #[error("unknown composition strategy '{name}', expected one of: {available}")]
    UnknownStrategy {
        /// Requested name
        name: String,
        /// Registered names, comma separated
        available: String,
    },

    /// Two recipes share a name, so diagnostics could not tell them apart
    #[error("recipe '{0}' is registered more than once")]
    DuplicateRecipe(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reject_is_not_accepted() {
        assert!(Resolution::Accept.is_accepted());
        assert!(Resolution::Overwrite(Vec::new()).is_accepted());
        assert!(!Resolution::Reject(Vec::new()).is_accepted());
    }

    #[test]
    fn unknown_strategy_lists_alternatives() {
        let err = CompositionError::UnknownStrategy {
            name: "hybrid".to_string(),
            available: "ordered, single_writer".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unknown composition strategy 'hybrid', expected one of: ordered, single_writer"
        );
    }
}
