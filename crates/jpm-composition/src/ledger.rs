//! Claim ledger for edits on one document
//!
//! Every value a recipe writes is claimed under the edit's locator
//! (`/project/parent/version`). A later recipe writing a different value to
//! the same locator collides with that claim. Structural inserts and
//! removals are recorded but never collide: a second recipe that wants the
//! same structure finds it already present and does nothing.

use jpm_tree::{EditKind, EditRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};

/// A value written by a recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// Recipe that wrote the value
    pub recipe: String,
    /// Printed node
    pub value: Option<String>,
}

/// Collision between a new edit and an earlier claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    /// Contested node
    pub locator: String,
    /// Earlier claim
    pub existing: Claim,
    /// Value the new recipe wants
    pub proposed: Claim,
}

impl Display for Conflict {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} already set by {} to {}, {} wants {}",
            self.locator,
            self.existing.recipe,
            self.existing.value.as_deref().unwrap_or("<removed>"),
            self.proposed.recipe,
            self.proposed.value.as_deref().unwrap_or("<removed>"),
        )
    }
}

/// Claims made so far on one document
#[derive(Debug, Clone, Default)]
pub struct ClaimLedger {
    claims: HashMap<String, Claim>,
}

impl ClaimLedger {
    /// Empty ledger
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collisions `recipe`'s edits would cause
    #[must_use]
    pub fn conflicts(&self, recipe: &str, edits: &[EditRecord]) -> Vec<Conflict> {
        edits
            .iter()
            .filter(|edit| edit.kind == EditKind::Replace)
            .filter_map(|edit| {
                let existing = self.claims.get(&edit.locator)?;
                (existing.recipe != recipe && existing.value != edit.value).then(|| Conflict {
                    locator: edit.locator.clone(),
                    existing: existing.clone(),
                    proposed: Claim {
                        recipe: recipe.to_string(),
                        value: edit.value.clone(),
                    },
                })
            })
            .collect()
    }

    /// Record `recipe`'s value edits, replacing earlier claims
    pub fn record(&mut self, recipe: &str, edits: &[EditRecord]) {
        for edit in edits.iter().filter(|e| e.kind == EditKind::Replace) {
            self.claims.insert(
                edit.locator.clone(),
                Claim {
                    recipe: recipe.to_string(),
                    value: edit.value.clone(),
                },
            );
        }
    }

    /// Claim on `locator`, if any
    #[must_use]
    pub fn claim(&self, locator: &str) -> Option<&Claim> {
        self.claims.get(locator)
    }

    /// Number of claimed locators
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    /// Whether nothing has been claimed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}
