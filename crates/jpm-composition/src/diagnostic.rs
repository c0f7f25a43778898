//! Diagnostics reported by the composer
//!
//! Every skipped or rejected recipe leaves a [`Diagnostic`] naming the
//! recipe, the document and the condition, so an intended edit is never
//! dropped silently.

use crate::ledger::Conflict;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// For the record only
    Info,
    /// An edit did not happen but the run is sound
    Warning,
    /// An intended edit was dropped
    Error,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The recipe's gate could not be evaluated, e.g. a malformed version
    NotApplicable,
    /// A node expected to be unique was not
    Ambiguous,
    /// The recipe's edits collided with another recipe's and were dropped
    Conflict,
    /// The recipe's edits replaced another recipe's values
    Overwritten,
    /// The recipe failed for another reason
    Failed,
    /// A generated file was not written because the path already exists
    GenerationSkipped,
}

/// A recipe-level finding on one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Recipe name
    pub recipe: String,
    /// Document path
    pub document: PathBuf,
    /// Category
    pub kind: DiagnosticKind,
    /// Seriousness
    pub severity: Severity,
    /// Human-readable explanation
    pub message: String,
}

impl Diagnostic {
    /// New diagnostic
    #[must_use]
    pub fn new(
        recipe: &str,
        document: &Path,
        kind: DiagnosticKind,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            recipe: recipe.to_string(),
            document: document.to_path_buf(),
            kind,
            severity,
            message: message.into(),
        }
    }

    /// Diagnostic for a contested value
    #[must_use]
    pub fn conflict(document: &Path, conflict: &Conflict, kind: DiagnosticKind, severity: Severity) -> Self {
        Self::new(&conflict.proposed.recipe, document, kind, severity, conflict.to_string())
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} on {}: {}",
            self.severity,
            self.recipe,
            self.document.display(),
            self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Claim;

    #[test]
    fn display_names_recipe_document_and_condition() {
        let d = Diagnostic::new(
            "UpgradeVersionProperty",
            Path::new("pom.xml"),
            DiagnosticKind::Ambiguous,
            Severity::Error,
            "pattern '/project/properties/jenkins.version' matched 2 nodes",
        );
        assert_eq!(
            d.to_string(),
            "error: UpgradeVersionProperty on pom.xml: pattern '/project/properties/jenkins.version' matched 2 nodes"
        );
    }

    #[test]
    fn conflict_is_attributed_to_the_later_recipe() {
        let conflict = Conflict {
            locator: "/project/parent/version".to_string(),
            existing: Claim {
                recipe: "A".to_string(),
                value: Some("<version>4.40</version>".to_string()),
            },
            proposed: Claim {
                recipe: "B".to_string(),
                value: Some("<version>4.51</version>".to_string()),
            },
        };
        let d = Diagnostic::conflict(Path::new("pom.xml"), &conflict, DiagnosticKind::Conflict, Severity::Error);
        assert_eq!(d.recipe, "B");
        assert!(d.message.contains("already set by A"));
    }

    #[test]
    fn serializes_kinds_in_snake_case() {
        let d = Diagnostic::new("R", Path::new("a"), DiagnosticKind::GenerationSkipped, Severity::Info, "m");
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["kind"], "generation_skipped");
        assert_eq!(json["severity"], "info");
        assert!(Severity::Error > Severity::Warning);
    }
}
