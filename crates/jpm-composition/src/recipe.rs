//! Recipe contract
//!
//! A [`Recipe`] is a named, configured transformation. `apply` is a pure
//! function of the source file and the recipe's fixed configuration: it
//! either finds nothing to do ([`RecipeResult::Unchanged`]) or returns one
//! complete new document together with the edits that produced it.

use jpm_maven::{CoordinateError, VersionError};
use jpm_tree::{Document, EditError, EditRecord, EditSession, Editable, MatchError, SourceFile};
use std::fmt::Debug;

/// Where a recipe runs relative to others on the same document
///
/// Narrow value edits run before structural edits, and read-only markers
/// observe the final state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Precedence {
    /// Rewrites leaf values in place
    #[default]
    Leaf,
    /// Adds or removes subtrees
    Structural,
    /// Only annotates the document
    Marker,
}

/// A named, parameterized document transformation
pub trait Recipe: Send + Sync + Debug {
    /// Stable identifier, e.g. `UpgradeParentPom`
    fn name(&self) -> &str;

    /// Human-readable title
    fn display_name(&self) -> &str;

    /// What the recipe does
    fn description(&self) -> &str;

    /// Scheduling class within one document
    fn precedence(&self) -> Precedence {
        Precedence::Leaf
    }

    /// Transform one source file
    ///
    /// # Errors
    /// Returns [`RecipeError`] when the document is in a shape the recipe
    /// cannot act on safely, such as an ambiguous match.
    fn apply(&self, source: &SourceFile) -> Result<RecipeResult, RecipeError>;

    /// New files derived from the (already edited) project sources
    ///
    /// # Errors
    /// Returns [`RecipeError`] when a source the generator depends on is
    /// malformed.
    fn generate(&self, sources: &[SourceFile]) -> Result<Vec<SourceFile>, RecipeError> {
        let _ = sources;
        Ok(Vec::new())
    }
}

/// Outcome of [`Recipe::apply`]
#[derive(Debug, Clone, PartialEq)]
pub enum RecipeResult {
    /// Nothing to do
    Unchanged,
    /// A new document
    Changed {
        /// The rewritten document
        document: Document,
        /// Edits in the order they were made
        edits: Vec<EditRecord>,
    },
}

impl RecipeResult {
    /// Changed result
    #[must_use]
    pub fn changed(document: impl Into<Document>, edits: Vec<EditRecord>) -> Self {
        Self::Changed {
            document: document.into(),
            edits,
        }
    }

    /// Result of an edit session; `Unchanged` when it recorded no edits
    #[must_use]
    pub fn from_session<D>(session: EditSession<D>) -> Self
    where
        D: Editable + Into<Document>,
    {
        if !session.is_changed() {
            return Self::Unchanged;
        }
        let (document, edits) = session.finish();
        Self::changed(document, edits)
    }

    /// Whether a new document was produced
    #[inline]
    #[must_use]
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed { .. })
    }

    /// The new document, if any
    #[must_use]
    pub fn document(&self) -> Option<&Document> {
        match self {
            Self::Changed { document, .. } => Some(document),
            Self::Unchanged => None,
        }
    }
}

/// Errors a recipe reports for one document
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecipeError {
    /// A node expected to be unique is not
    #[error(transparent)]
    Ambiguous(#[from] MatchError),

    /// A version the recipe gates on cannot be ordered
    #[error("malformed version: {0}")]
    MalformedVersion(#[from] VersionError),

    /// The editor rejected an edit
    #[error("edit failed: {0}")]
    Edit(#[from] EditError),

    /// A coordinate in the document or the configuration is malformed
    #[error(transparent)]
    Coordinate(#[from] CoordinateError),

    /// The recipe was configured with unusable options
    #[error("invalid configuration for {recipe}: {reason}")]
    InvalidConfiguration {
        /// Recipe name
        recipe: String,
        /// What is wrong
        reason: String,
    },
}

impl RecipeError {
    /// Configuration error for `recipe`
    #[must_use]
    pub fn invalid_configuration(recipe: &str, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            recipe: recipe.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the error only means "this recipe does not apply here"
    #[inline]
    #[must_use]
    pub fn is_not_applicable(&self) -> bool {
        matches!(self, Self::MalformedVersion(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jpm_tree::{Element, NodePath, XmlDocument};

    #[test]
    fn empty_session_is_unchanged() {
        let session = EditSession::new(XmlDocument::from_root(Element::new("project")));
        assert_eq!(RecipeResult::from_session(session), RecipeResult::Unchanged);
    }

    #[test]
    fn session_with_edits_is_changed() {
        let doc = XmlDocument::from_root(Element::new("project").with_child(Element::with_text("version", "1")));
        let mut session = EditSession::new(doc);
        session.set_text(&NodePath::new([0]), "2").unwrap();
        let result = RecipeResult::from_session(session);
        assert!(result.is_changed());
        assert_eq!(
            result.document().map(Document::print).as_deref(),
            Some("<project><version>2</version></project>")
        );
    }

    #[test]
    fn precedence_orders_leaf_first() {
        let mut all = vec![Precedence::Marker, Precedence::Leaf, Precedence::Structural];
        all.sort();
        assert_eq!(all, vec![Precedence::Leaf, Precedence::Structural, Precedence::Marker]);
    }

    #[test]
    fn malformed_version_is_not_applicable() {
        let err = RecipeError::from(VersionError::Empty);
        assert!(err.is_not_applicable());
        assert!(!RecipeError::invalid_configuration("X", "bad").is_not_applicable());
    }
}
