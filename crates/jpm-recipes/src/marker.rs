//! Plugin detection marker

use crate::pom_edit::{plugin_jenkins_version, pom_document};
use jpm_composition::{Precedence, Recipe, RecipeError, RecipeResult};
use jpm_maven::{PomView, VersionRange};
use jpm_tree::{Markable, SourceFile};
use serde::{Deserialize, Serialize};

/// Options for [`IsJenkinsPlugin`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsJenkinsPluginOptions {
    /// Range of `jenkins.version` values to mark, `*` for any
    pub version: String,
}

/// Marks POMs of Jenkins plugins whose `jenkins.version` is in a range
///
/// The marker carries the core version, so it can be read back without
/// re-running detection. A plugin that inherits its core from the plugin
/// parent is marked with the parent coordinate, and only by the `*` range.
#[derive(Debug, Clone)]
pub struct IsJenkinsPlugin {
    range: VersionRange,
}

impl IsJenkinsPlugin {
    /// Marker for plugins built against a core in `range`
    ///
    /// # Errors
    /// Returns [`RecipeError::InvalidConfiguration`] for bad range syntax.
    pub fn new(range: &str) -> Result<Self, RecipeError> {
        let range = VersionRange::parse(range)
            .map_err(|e| RecipeError::invalid_configuration("IsJenkinsPlugin", e.to_string()))?;
        Ok(Self { range })
    }

    /// Build from options
    ///
    /// # Errors
    /// Same as [`IsJenkinsPlugin::new`].
    pub fn from_options(options: &IsJenkinsPluginOptions) -> Result<Self, RecipeError> {
        Self::new(&options.version)
    }
}

impl Recipe for IsJenkinsPlugin {
    fn name(&self) -> &str {
        "IsJenkinsPlugin"
    }

    fn display_name(&self) -> &str {
        "Is the project a Jenkins plugin?"
    }

    fn description(&self) -> &str {
        "Checks if the project is a Jenkins plugin by the presence of a managed version of jenkins-core."
    }

    fn precedence(&self) -> Precedence {
        Precedence::Marker
    }

    fn apply(&self, source: &SourceFile) -> Result<RecipeResult, RecipeError> {
        let Some(doc) = pom_document(source) else {
            return Ok(RecipeResult::Unchanged);
        };
        if doc.is_marked() {
            return Ok(RecipeResult::Unchanged);
        }
        let pom = PomView::new(doc);
        if !pom.is_jenkins_plugin() {
            return Ok(RecipeResult::Unchanged);
        }
        let description = match plugin_jenkins_version(&pom)? {
            Some(version) if self.range.contains_text(&version) => version,
            Some(version) => {
                tracing::debug!(%version, range = %self.range, "plugin outside range");
                return Ok(RecipeResult::Unchanged);
            }
            // Core managed by the parent; only an open range can accept it
            None if self.range.is_any() => pom
                .parent()
                .map_or_else(|| pom.packaging(), |parent| parent.coordinate.to_string()),
            None => {
                tracing::debug!(range = %self.range, "core version not declared");
                return Ok(RecipeResult::Unchanged);
            }
        };
        Ok(RecipeResult::changed(doc.mark(&description), Vec::new()))
    }
}
