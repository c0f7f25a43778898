//! Small recipes for exercising the composer

use crate::recipe::{Precedence, Recipe, RecipeError, RecipeResult};
use jpm_tree::{EditSession, NodePath, SourceFile, TextDocument};
use std::sync::Arc;

#[derive(Debug)]
pub(crate) struct NamedRecipe {
    name: String,
    precedence: Precedence,
}

impl NamedRecipe {
    pub(crate) fn arc(name: &str, precedence: Precedence) -> Arc<dyn Recipe> {
        Arc::new(Self {
            name: name.to_string(),
            precedence,
        })
    }
}

impl Recipe for NamedRecipe {
    fn name(&self) -> &str {
        &self.name
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "does nothing"
    }

    fn precedence(&self) -> Precedence {
        self.precedence
    }

    fn apply(&self, _: &SourceFile) -> Result<RecipeResult, RecipeError> {
        Ok(RecipeResult::Unchanged)
    }
}

/// Sets `/project/parent/version` unconditionally
#[derive(Debug)]
pub(crate) struct SetVersion {
    name: String,
    version: String,
}

impl SetVersion {
    pub(crate) fn arc(name: &str, version: &str) -> Arc<dyn Recipe> {
        Arc::new(Self {
            name: name.to_string(),
            version: version.to_string(),
        })
    }
}

impl Recipe for SetVersion {
    fn name(&self) -> &str {
        &self.name
    }

    fn display_name(&self) -> &str {
        "Set parent version"
    }

    fn description(&self) -> &str {
        "Sets the parent version."
    }

    fn apply(&self, source: &SourceFile) -> Result<RecipeResult, RecipeError> {
        let Some(doc) = source.document().as_xml() else {
            return Ok(RecipeResult::Unchanged);
        };
        let mut session = EditSession::new(doc.clone());
        session.set_text(&NodePath::new([0, 0]), &self.version)?;
        Ok(RecipeResult::from_session(session))
    }
}

#[derive(Debug)]
pub(crate) struct FailingRecipe {
    name: String,
    error: RecipeError,
}

impl FailingRecipe {
    pub(crate) fn arc(name: &str, error: RecipeError) -> Arc<dyn Recipe> {
        Arc::new(Self {
            name: name.to_string(),
            error,
        })
    }
}

impl Recipe for FailingRecipe {
    fn name(&self) -> &str {
        &self.name
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "always fails"
    }

    fn apply(&self, _: &SourceFile) -> Result<RecipeResult, RecipeError> {
        Err(self.error.clone())
    }
}

/// Generates an empty text file at a fixed path
#[derive(Debug)]
pub(crate) struct TouchFile {
    name: String,
    path: String,
}

impl TouchFile {
    pub(crate) fn arc(name: &str, path: &str) -> Arc<dyn Recipe> {
        Arc::new(Self {
            name: name.to_string(),
            path: path.to_string(),
        })
    }
}

impl Recipe for TouchFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "creates a file"
    }

    fn precedence(&self) -> Precedence {
        Precedence::Structural
    }

    fn apply(&self, _: &SourceFile) -> Result<RecipeResult, RecipeError> {
        Ok(RecipeResult::Unchanged)
    }

    fn generate(&self, _: &[SourceFile]) -> Result<Vec<SourceFile>, RecipeError> {
        Ok(vec![SourceFile::new(self.path.as_str(), TextDocument::new(""))])
    }
}
