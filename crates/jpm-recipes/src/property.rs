//! Monotonic property upgrade

use crate::pom_edit::{is_element_name, pom_document, upgrade_property};
use jpm_composition::{Recipe, RecipeError, RecipeResult};
use jpm_maven::VersionString;
use jpm_tree::{EditSession, SourceFile};
use serde::{Deserialize, Serialize};

const NAME: &str = "UpgradeVersionProperty";

/// Options for [`UpgradeVersionProperty`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeVersionPropertyOptions {
    /// Property name, e.g. `jenkins.version`
    pub key: String,
    /// Value the property is raised to when it is lower
    pub minimum_version: String,
}

/// Raises a `<properties>` entry to a minimum version
///
/// The property is inserted when the POM does not declare it. A value at
/// or above the minimum is never touched. The recipe is named after its
/// key, e.g. `UpgradeVersionProperty[jenkins.version]`, so one run can
/// upgrade several properties.
#[derive(Debug, Clone)]
pub struct UpgradeVersionProperty {
    name: String,
    key: String,
    minimum: VersionString,
}

impl UpgradeVersionProperty {
    /// Recipe raising `key` to `minimum_version`
    ///
    /// # Errors
    /// Returns [`RecipeError::InvalidConfiguration`] when `key` is not an
    /// element name or `minimum_version` is not a version.
    pub fn new(key: &str, minimum_version: &str) -> Result<Self, RecipeError> {
        if !is_element_name(key) {
            return Err(RecipeError::invalid_configuration(NAME, format!("'{key}' is not a property name")));
        }
        let minimum = VersionString::parse(minimum_version)
            .map_err(|e| RecipeError::invalid_configuration(NAME, e.to_string()))?;
        Ok(Self {
            name: format!("{NAME}[{key}]"),
            key: key.to_string(),
            minimum,
        })
    }

    /// Build from options
    ///
    /// # Errors
    /// Same as [`UpgradeVersionProperty::new`].
    pub fn from_options(options: &UpgradeVersionPropertyOptions) -> Result<Self, RecipeError> {
        Self::new(&options.key, &options.minimum_version)
    }

    /// Property name
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Target version
    #[inline]
    #[must_use]
    pub fn minimum(&self) -> &VersionString {
        &self.minimum
    }
}

impl Recipe for UpgradeVersionProperty {
    fn name(&self) -> &str {
        &self.name
    }

    fn display_name(&self) -> &str {
        "Upgrade property's value to version"
    }

    fn description(&self) -> &str {
        "If the current value is < given version, upgrade it."
    }

    fn apply(&self, source: &SourceFile) -> Result<RecipeResult, RecipeError> {
        let Some(doc) = pom_document(source) else {
            return Ok(RecipeResult::Unchanged);
        };
        let mut session = EditSession::new(doc.clone());
        upgrade_property(&mut session, &self.key, &self.minimum)?;
        Ok(RecipeResult::from_session(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jpm_test_utils::{assert_rewrite, assert_unchanged, parse_pom};

    const BEFORE: &str = r"
        <project>
            <parent>
                <groupId>org.jenkins-ci.plugins</groupId>
                <artifactId>plugin</artifactId>
                <version>4.86</version>
                <relativePath/>
            </parent>
            <artifactId>example-plugin</artifactId>
            <version>0.8-SNAPSHOT</version>
            <properties>
                <jenkins.version>2.303.1</jenkins.version>
            </properties>
            <repositories>
                <repository>
                    <id>repo.jenkins-ci.org</id>
                    <url>http://repo.jenkins-ci.org/public/</url>
                </repository>
            </repositories>
        </project>
        ";

    #[test]
    fn should_upgrade() {
        let recipe = UpgradeVersionProperty::new("jenkins.version", "2.364.1").unwrap();
        assert_rewrite(
            &recipe,
            &parse_pom(BEFORE),
            &BEFORE.replace("2.303.1</jenkins.version>", "2.364.1</jenkins.version>"),
        );
    }

    #[test]
    fn should_not_downgrade() {
        let recipe = UpgradeVersionProperty::new("jenkins.version", "2.364.1").unwrap();
        assert_unchanged(&recipe, &parse_pom(&BEFORE.replace("2.303.1", "2.387.1")));
    }

    #[test]
    fn equal_after_padding_is_unchanged() {
        let recipe = UpgradeVersionProperty::new("jenkins.version", "2.303.1.0").unwrap();
        assert_unchanged(&recipe, &parse_pom(BEFORE));
    }

    #[test]
    fn rejects_bad_options() {
        assert!(UpgradeVersionProperty::new("", "1.0").is_err());
        assert!(UpgradeVersionProperty::new("jenkins.version", "").is_err());
        let options = UpgradeVersionPropertyOptions {
            key: "jenkins.version".into(),
            minimum_version: "2.361.4".into(),
        };
        let recipe = UpgradeVersionProperty::from_options(&options).unwrap();
        assert_eq!(recipe.key(), "jenkins.version");
        assert_eq!(recipe.name(), "UpgradeVersionProperty[jenkins.version]");
        assert_eq!(recipe.minimum().as_str(), "2.361.4");
    }
}
