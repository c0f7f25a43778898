//! Jelly view recipes

use crate::pom_edit::pom_document;
use jpm_composition::{Precedence, Recipe, RecipeError, RecipeResult};
use jpm_maven::PomView;
use jpm_tree::{EditSession, NodePath, SourceFile, TextDocument};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Declaration every Jelly view should start with
pub const JELLY_DECLARATION: &str = "<?jelly escape-by-default='true'?>";

/// Location of the plugin description view, relative to the POM
pub const INDEX_JELLY: &str = "src/main/resources/index.jelly";

/// Text used when a plugin has neither description nor artifactId
pub const INDEX_JELLY_PLACEHOLDER: &str = "Update src/main/resources/index.jelly for a better description.";

static ANY_JELLY_DECLARATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i)<\?jelly\s+[^>]*>").expect("static regex"));

/// Contents of a generated `index.jelly`
///
/// The first non-blank of description and artifactId wins; the fixed
/// placeholder is used when both are blank.
#[must_use]
pub fn index_jelly_contents(description: Option<&str>, artifact_id: Option<&str>) -> String {
    let text = [description, artifact_id]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(INDEX_JELLY_PLACEHOLDER);
    format!("{JELLY_DECLARATION}\n<div>\n{text}\n</div>\n")
}

/// Creates `src/main/resources/index.jelly` for plugins that lack one
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateIndexJelly;

impl CreateIndexJelly {
    /// The recipe
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn index_path(pom: &Path) -> PathBuf {
        pom.parent().unwrap_or_else(|| Path::new("")).join(INDEX_JELLY)
    }
}

impl Recipe for CreateIndexJelly {
    fn name(&self) -> &str {
        "CreateIndexJelly"
    }

    fn display_name(&self) -> &str {
        "Create `index.jelly` if it doesn't exist"
    }

    fn description(&self) -> &str {
        "Jenkins tooling requires `src/main/resources/index.jelly` exists with a description."
    }

    fn precedence(&self) -> Precedence {
        Precedence::Structural
    }

    fn apply(&self, _: &SourceFile) -> Result<RecipeResult, RecipeError> {
        Ok(RecipeResult::Unchanged)
    }

    fn generate(&self, sources: &[SourceFile]) -> Result<Vec<SourceFile>, RecipeError> {
        let existing: HashSet<&Path> = sources.iter().map(SourceFile::path).collect();
        let mut generated = Vec::new();
        for source in sources {
            let Some(doc) = pom_document(source) else {
                continue;
            };
            let pom = PomView::new(doc);
            if !pom.is_jenkins_plugin() {
                continue;
            }
            let path = Self::index_path(source.path());
            if existing.contains(path.as_path()) {
                continue;
            }
            let contents = index_jelly_contents(pom.description().as_deref(), pom.artifact_id().as_deref());
            tracing::debug!(pom = %source.path().display(), path = %path.display(), "generating index.jelly");
            generated.push(SourceFile::new(path, TextDocument::new(contents)));
        }
        Ok(generated)
    }
}

/// Ensures `.jelly` files start with the escape-by-default declaration
#[derive(Debug, Clone, Copy, Default)]
pub struct AddJellyXmlDeclaration;

impl AddJellyXmlDeclaration {
    /// The recipe
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Text with the declaration in front, `None` when already there
    fn declared(doc: &TextDocument) -> Option<String> {
        let text = doc.text();
        if text.starts_with(JELLY_DECLARATION) {
            return None;
        }
        if text.trim().is_empty() {
            return Some(JELLY_DECLARATION.to_string());
        }
        let line_ending = doc.line_ending();
        let leading = text.trim_start();
        let body = match ANY_JELLY_DECLARATION.find(leading) {
            Some(declaration) => {
                let rest = &leading[declaration.end()..];
                rest.strip_prefix("\r\n")
                    .or_else(|| rest.strip_prefix('\n'))
                    .unwrap_or(rest)
            }
            None => text,
        };
        Some(format!("{JELLY_DECLARATION}{line_ending}{body}"))
    }
}

impl Recipe for AddJellyXmlDeclaration {
    fn name(&self) -> &str {
        "AddJellyXmlDeclaration"
    }

    fn display_name(&self) -> &str {
        "Add XML declaration to Jelly files"
    }

    fn description(&self) -> &str {
        "Ensure the XML declaration `<?jelly escape-by-default='true'?>` is present in all `.jelly` files."
    }

    fn apply(&self, source: &SourceFile) -> Result<RecipeResult, RecipeError> {
        if !source.has_extension("jelly") {
            return Ok(RecipeResult::Unchanged);
        }
        let Some(doc) = source.document().as_text() else {
            return Ok(RecipeResult::Unchanged);
        };
        let Some(text) = Self::declared(doc) else {
            return Ok(RecipeResult::Unchanged);
        };
        let mut session = EditSession::new(doc.clone());
        session.replace(&NodePath::root(), text)?;
        Ok(RecipeResult::from_session(session))
    }
}
