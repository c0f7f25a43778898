//! Parent POM recipes
//!
//! - [`UpgradeParentVersion`]: monotonic upgrade of one parent coordinate
//! - [`DisableLocalResolutionForParentPom`]: pin `<relativePath/>`
//! - [`UpgradeParentPom`]: plugin parent, `jenkins.version` and
//!   `<relativePath/>` in one step

use crate::pom_edit::{disable_local_resolution, pom_document, upgrade_parent, upgrade_property};
use jpm_composition::{Precedence, Recipe, RecipeError, RecipeResult};
use jpm_maven::{PomView, VersionString, JENKINS_VERSION_PROPERTY, PLUGIN_PARENT};
use jpm_tree::{EditSession, SourceFile};
use serde::{Deserialize, Serialize};

fn parse_target(recipe: &str, field: &str, version: &str) -> Result<VersionString, RecipeError> {
    VersionString::parse(version).map_err(|e| RecipeError::invalid_configuration(recipe, format!("{field}: {e}")))
}

/// Options for [`UpgradeParentVersion`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeParentVersionOptions {
    /// Parent groupId
    pub group_id: String,
    /// Parent artifactId
    pub artifact_id: String,
    /// Version the parent is raised to when it is lower
    pub version: String,
}

/// Raises the version of a specific parent POM
#[derive(Debug, Clone)]
pub struct UpgradeParentVersion {
    name: String,
    group_id: String,
    artifact_id: String,
    target: VersionString,
}

impl UpgradeParentVersion {
    const NAME: &'static str = "UpgradeParentVersion";

    /// Recipe raising parent `group_id:artifact_id` to `version`
    ///
    /// # Errors
    /// Returns [`RecipeError::InvalidConfiguration`] for blank ids or a
    /// malformed version.
    pub fn new(group_id: &str, artifact_id: &str, version: &str) -> Result<Self, RecipeError> {
        if group_id.trim().is_empty() || artifact_id.trim().is_empty() {
            return Err(RecipeError::invalid_configuration(Self::NAME, "parent coordinate is blank"));
        }
        Ok(Self {
            name: format!("{}[{group_id}:{artifact_id}]", Self::NAME),
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            target: parse_target(Self::NAME, "version", version)?,
        })
    }

    /// Build from options
    ///
    /// # Errors
    /// Same as [`UpgradeParentVersion::new`].
    pub fn from_options(options: &UpgradeParentVersionOptions) -> Result<Self, RecipeError> {
        Self::new(&options.group_id, &options.artifact_id, &options.version)
    }
}

impl Recipe for UpgradeParentVersion {
    fn name(&self) -> &str {
        &self.name
    }

    fn display_name(&self) -> &str {
        "Upgrade parent version"
    }

    fn description(&self) -> &str {
        "Raises the parent POM version unless it is already at or above the target."
    }

    fn apply(&self, source: &SourceFile) -> Result<RecipeResult, RecipeError> {
        let Some(doc) = pom_document(source) else {
            return Ok(RecipeResult::Unchanged);
        };
        let mut session = EditSession::new(doc.clone());
        upgrade_parent(&mut session, &self.group_id, &self.artifact_id, &self.target)?;
        Ok(RecipeResult::from_session(session))
    }
}

/// Explicitly sets `<relativePath/>` so Maven never resolves the parent POM
/// from the local file system
#[derive(Debug, Clone, Copy, Default)]
pub struct DisableLocalResolutionForParentPom;

impl DisableLocalResolutionForParentPom {
    /// The recipe
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Recipe for DisableLocalResolutionForParentPom {
    fn name(&self) -> &str {
        "DisableLocalResolutionForParentPom"
    }

    fn display_name(&self) -> &str {
        "Disables local file resolution for parent POM"
    }

    fn description(&self) -> &str {
        "Explicitly sets `<relativePath/>` to disable file resolution, as recommended in the plugin development guide."
    }

    fn precedence(&self) -> Precedence {
        Precedence::Structural
    }

    fn apply(&self, source: &SourceFile) -> Result<RecipeResult, RecipeError> {
        let Some(doc) = pom_document(source) else {
            return Ok(RecipeResult::Unchanged);
        };
        let mut session = EditSession::new(doc.clone());
        disable_local_resolution(&mut session)?;
        Ok(RecipeResult::from_session(session))
    }
}

/// Options for [`UpgradeParentPom`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeParentPomOptions {
    /// Minimum `org.jenkins-ci.plugins:plugin` version
    pub parent_version: String,
    /// Minimum `jenkins.version`
    pub jenkins_version: String,
}

/// Moves a Jenkins plugin onto a newer plugin parent POM
///
/// Raises the parent version and `jenkins.version` independently, each
/// only when it is behind, and disables local parent resolution.
#[derive(Debug, Clone)]
pub struct UpgradeParentPom {
    parent_version: VersionString,
    jenkins_version: VersionString,
}

impl UpgradeParentPom {
    const NAME: &'static str = "UpgradeParentPom";

    /// Recipe targeting `parent_version` / `jenkins_version`
    ///
    /// # Errors
    /// Returns [`RecipeError::InvalidConfiguration`] for a malformed version.
    pub fn new(parent_version: &str, jenkins_version: &str) -> Result<Self, RecipeError> {
        Ok(Self {
            parent_version: parse_target(Self::NAME, "parent_version", parent_version)?,
            jenkins_version: parse_target(Self::NAME, "jenkins_version", jenkins_version)?,
        })
    }

    /// Build from options
    ///
    /// # Errors
    /// Same as [`UpgradeParentPom::new`].
    pub fn from_options(options: &UpgradeParentPomOptions) -> Result<Self, RecipeError> {
        Self::new(&options.parent_version, &options.jenkins_version)
    }
}

impl Recipe for UpgradeParentPom {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn display_name(&self) -> &str {
        "Upgrade Jenkins plugin parent POM"
    }

    fn description(&self) -> &str {
        "Raises the plugin parent POM and `jenkins.version` to minimum versions and disables local parent resolution."
    }

    fn precedence(&self) -> Precedence {
        Precedence::Structural
    }

    fn apply(&self, source: &SourceFile) -> Result<RecipeResult, RecipeError> {
        let Some(doc) = pom_document(source) else {
            return Ok(RecipeResult::Unchanged);
        };
        if !PomView::new(doc).has_plugin_parent() {
            return Ok(RecipeResult::Unchanged);
        }
        let mut session = EditSession::new(doc.clone());
        upgrade_parent(&mut session, PLUGIN_PARENT.0, PLUGIN_PARENT.1, &self.parent_version)?;
        upgrade_property(&mut session, JENKINS_VERSION_PROPERTY, &self.jenkins_version)?;
        disable_local_resolution(&mut session)?;
        Ok(RecipeResult::from_session(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jpm_test_utils::{assert_rewrite, assert_unchanged, parse_pom};

    #[test]
    fn upgrades_plugin_parent_and_core() {
        let before = r"
            <project>
                <parent>
                    <groupId>org.jenkins-ci.plugins</groupId>
                    <artifactId>plugin</artifactId>
                    <version>3.40</version>
                </parent>
                <artifactId>example</artifactId>
                <properties>
                    <jenkins.version>2.107.3</jenkins.version>
                </properties>
            </project>
            ";
        let after = r"
            <project>
                <parent>
                    <groupId>org.jenkins-ci.plugins</groupId>
                    <artifactId>plugin</artifactId>
                    <version>4.40</version>
                    <relativePath/>
                </parent>
                <artifactId>example</artifactId>
                <properties>
                    <jenkins.version>2.303.3</jenkins.version>
                </properties>
            </project>
            ";
        let recipe = UpgradeParentPom::new("4.40", "2.303.3").unwrap();
        assert_rewrite(&recipe, &parse_pom(before), after);
    }

    #[test]
    fn newer_plugin_parent_only_gets_relative_path() {
        let before = r"
            <project>
                <parent>
                    <groupId>org.jenkins-ci.plugins</groupId>
                    <artifactId>plugin</artifactId>
                    <version>4.51</version>
                    <relativePath>../parent</relativePath>
                </parent>
                <properties>
                    <jenkins.version>2.361.4</jenkins.version>
                </properties>
            </project>
            ";
        let recipe = UpgradeParentPom::new("4.40", "2.303.3").unwrap();
        assert_rewrite(
            &recipe,
            &parse_pom(before),
            &before.replace("<relativePath>../parent</relativePath>", "<relativePath/>"),
        );
    }

    #[test]
    fn not_a_plugin_is_unchanged() {
        let before = r"
            <project>
                <parent>
                    <groupId>org.example</groupId>
                    <artifactId>parent</artifactId>
                    <version>1</version>
                </parent>
            </project>
            ";
        assert_unchanged(&UpgradeParentPom::new("4.40", "2.303.3").unwrap(), &parse_pom(before));
    }

    #[test]
    fn parent_version_upgrade_is_monotonic() {
        let before = r"
            <project>
                <parent>
                    <groupId>org.example</groupId>
                    <artifactId>parent</artifactId>
                    <version>1.2</version>
                </parent>
            </project>
            ";
        let recipe = UpgradeParentVersion::new("org.example", "parent", "1.10").unwrap();
        assert_rewrite(&recipe, &parse_pom(before), &before.replace("1.2<", "1.10<"));
        let newer = UpgradeParentVersion::new("org.example", "parent", "1.1").unwrap();
        assert_unchanged(&newer, &parse_pom(before));
        assert!(UpgradeParentVersion::new("", "parent", "1").is_err());
    }

    #[test]
    fn relative_path_follows_version() {
        let before = r"
            <project>
                <parent>
                    <groupId>org.jenkins-ci.plugins</groupId>
                    <artifactId>plugin</artifactId>
                    <version>4.86</version>
                </parent>
            </project>
            ";
        let after = r"
            <project>
                <parent>
                    <groupId>org.jenkins-ci.plugins</groupId>
                    <artifactId>plugin</artifactId>
                    <version>4.86</version>
                    <relativePath/>
                </parent>
            </project>
            ";
        assert_rewrite(&DisableLocalResolutionForParentPom::new(), &parse_pom(before), after);
        assert_unchanged(
            &DisableLocalResolutionForParentPom::new(),
            &parse_pom(&before.replace("</version>", "</version>\n<relativePath />")),
        );
    }
}
