//! Library substitution with API plugins
//!
//! Jenkins ships popular libraries as "API plugins" so that every plugin
//! shares one copy. [`ReplaceLibrariesWithApiPlugin`] swaps direct
//! dependencies on such a library for the API plugin, and excludes the
//! library from any other dependency that would still pull it in.

use crate::pom_edit::{insert_dependency, pom_document};
use jpm_composition::{Precedence, Recipe, RecipeError, RecipeResult};
use jpm_maven::{
    schema, Coordinate, DependencyResolver, ExclusionEdit, NoResolver, PomView, SubstitutionPlan, SubstitutionRule,
};
use jpm_tree::{EditSession, Element, InsertPosition, NodePath, SourceFile, XmlDocument, XmlNode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

const NAME: &str = "ReplaceLibrariesWithApiPlugin";

/// A library bundled by an API plugin
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Library {
    /// Library groupId
    pub group_id: String,
    /// Library artifactId
    pub artifact_id: String,
}

impl Library {
    /// Library `group_id:artifact_id`
    #[must_use]
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
        }
    }
}

/// Options for [`ReplaceLibrariesWithApiPlugin`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceLibrariesWithApiPluginOptions {
    /// API plugin groupId
    pub plugin_group_id: String,
    /// API plugin artifactId
    pub plugin_artifact_id: String,
    /// API plugin version
    pub plugin_version: String,
    /// Libraries the API plugin bundles
    pub replaces: Vec<Library>,
}

/// Prefers Jenkins API plugins over bundling the libraries they provide
pub struct ReplaceLibrariesWithApiPlugin {
    name: String,
    rule: SubstitutionRule,
    resolver: Arc<dyn DependencyResolver>,
}

impl fmt::Debug for ReplaceLibrariesWithApiPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplaceLibrariesWithApiPlugin")
            .field("rule", &self.rule)
            .finish_non_exhaustive()
    }
}

impl ReplaceLibrariesWithApiPlugin {
    /// Recipe for one API plugin; transitive lookups see no dependencies
    /// until a resolver is attached with [`Self::with_resolver`]
    ///
    /// # Errors
    /// Returns [`RecipeError::InvalidConfiguration`] when the plugin
    /// coordinate is blank or `replaces` is empty.
    pub fn new(options: &ReplaceLibrariesWithApiPluginOptions) -> Result<Self, RecipeError> {
        let invalid = |reason: &str| RecipeError::invalid_configuration(NAME, reason);
        if [&options.plugin_group_id, &options.plugin_artifact_id, &options.plugin_version]
            .iter()
            .any(|s| s.trim().is_empty())
        {
            return Err(invalid("plugin coordinate must have group, artifact and version"));
        }
        if options.replaces.is_empty() {
            return Err(invalid("no libraries to replace"));
        }
        let replacement = Coordinate::new(options.plugin_group_id.trim(), options.plugin_artifact_id.trim())
            .with_version(options.plugin_version.trim());
        let bundled = options
            .replaces
            .iter()
            .map(|l| Coordinate::new(l.group_id.trim(), l.artifact_id.trim()));
        Ok(Self {
            name: format!("{NAME}[{}]", replacement.key()),
            rule: SubstitutionRule::new(replacement, bundled)?,
            resolver: Arc::new(NoResolver),
        })
    }

    /// Use `resolver` to find which dependencies pull bundled libraries in
    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn DependencyResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// The substitution rule
    #[inline]
    #[must_use]
    pub fn rule(&self) -> &SubstitutionRule {
        &self.rule
    }

    fn execute(&self, session: &mut EditSession<XmlDocument>, plan: &SubstitutionPlan) -> Result<(), RecipeError> {
        let replacement = self.rule.replacement();
        // Exclusions go inside their own <dependency>, so sibling paths stay valid.
        for edit in &plan.exclusions {
            add_exclusions(session, edit, replacement)?;
        }
        if let Some(path) = &plan.replace {
            rewrite_coordinate(session, path, replacement)?;
        }
        for path in plan.remove.iter().rev() {
            session.remove(path)?;
        }
        if plan.insert_replacement {
            insert_dependency(session, replacement)?;
        }
        Ok(())
    }
}

fn exclusion_element(excluded: &Coordinate, replacement: &Coordinate) -> Element {
    Element::new("exclusion")
        .with_node(XmlNode::comment(&format!("brought in by {}", replacement.key())))
        .with_child(Element::with_text("groupId", &excluded.group_id))
        .with_child(Element::with_text("artifactId", &excluded.artifact_id))
}

fn add_exclusions(
    session: &mut EditSession<XmlDocument>,
    edit: &ExclusionEdit,
    replacement: &Coordinate,
) -> Result<(), RecipeError> {
    let existing = session
        .document()
        .element_at(&edit.dependency)
        .and_then(|dependency| dependency.child_index("exclusions"));
    match existing {
        Some(index) => {
            let block = edit.dependency.child(index);
            for excluded in &edit.exclude {
                let node = XmlNode::Element(exclusion_element(excluded, replacement));
                session.insert_child(&block, node, &InsertPosition::Last)?;
            }
        }
        None => {
            let block = edit
                .exclude
                .iter()
                .fold(Element::new("exclusions"), |block, excluded| {
                    block.with_child(exclusion_element(excluded, replacement))
                });
            session.insert_child(
                &edit.dependency,
                XmlNode::Element(block),
                &schema::ordered(schema::dependency()),
            )?;
        }
    }
    tracing::debug!(
        dependency = %edit.coordinate,
        excluded = edit.exclude.len(),
        "excluded libraries provided by {replacement}"
    );
    Ok(())
}

/// Turn the `<dependency>` at `path` into `replacement` in place
fn rewrite_coordinate(
    session: &mut EditSession<XmlDocument>,
    path: &NodePath,
    replacement: &Coordinate,
) -> Result<(), RecipeError> {
    let Some(dependency) = session.document().element_at(path) else {
        return Ok(());
    };
    let group = dependency.child_index("groupId");
    let artifact = dependency.child_index("artifactId");
    let version = dependency.child_index("version");
    if let Some(i) = group {
        session.set_text(&path.child(i), &replacement.group_id)?;
    }
    if let Some(i) = artifact {
        session.set_text(&path.child(i), &replacement.artifact_id)?;
    }
    let Some(target) = replacement.version.as_deref() else {
        return Ok(());
    };
    match version {
        Some(i) => session.set_text(&path.child(i), target)?,
        None => {
            session.insert_child(
                path,
                XmlNode::Element(Element::with_text("version", target)),
                &schema::ordered(schema::dependency()),
            )?;
        }
    }
    Ok(())
}

impl Recipe for ReplaceLibrariesWithApiPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn display_name(&self) -> &str {
        "Use API plugin instead of direct dependency"
    }

    fn description(&self) -> &str {
        "Prefer Jenkins API plugins over bundling libraries for slimmer plugins."
    }

    fn precedence(&self) -> Precedence {
        Precedence::Structural
    }

    fn apply(&self, source: &SourceFile) -> Result<RecipeResult, RecipeError> {
        let Some(doc) = pom_document(source) else {
            return Ok(RecipeResult::Unchanged);
        };
        let plan = self.rule.plan(&PomView::new(doc).dependencies(), self.resolver.as_ref());
        if plan.is_empty() {
            return Ok(RecipeResult::Unchanged);
        }
        let mut session = EditSession::new(doc.clone());
        self.execute(&mut session, &plan)?;
        Ok(RecipeResult::from_session(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jpm_maven::StaticResolver;
    use jpm_test_utils::{assert_rewrite, assert_unchanged, parse_pom};

    fn commons_text() -> ReplaceLibrariesWithApiPlugin {
        ReplaceLibrariesWithApiPlugin::new(&ReplaceLibrariesWithApiPluginOptions {
            plugin_group_id: "io.jenkins.plugins".into(),
            plugin_artifact_id: "commons-text-api".into(),
            plugin_version: "1.9-5.v7ea_44fe6061c".into(),
            replaces: vec![Library::new("org.apache.commons", "commons-text")],
        })
        .unwrap()
    }

    fn pom(dependencies: &str) -> String {
        format!(
            r"
            <project>
                <parent>
                    <groupId>org.jenkins-ci.plugins</groupId>
                    <artifactId>plugin</artifactId>
                    <version>4.86</version>
                    <relativePath />
                </parent>

                <properties>
                    <jenkins.version>2.440.3</jenkins.version>
                </properties>

                <dependencies>{dependencies}
                </dependencies>
            </project>
            "
        )
    }

    const COMMONS_TEXT: &str = r"
                    <dependency>
                        <groupId>org.apache.commons</groupId>
                        <artifactId>commons-text</artifactId>
                        <version>1.9</version>
                    </dependency>";

    const API_PLUGIN: &str = r"
                    <dependency>
                        <groupId>io.jenkins.plugins</groupId>
                        <artifactId>commons-text-api</artifactId>
                        <version>1.9-5.v7ea_44fe6061c</version>
                    </dependency>";

    const TURBINE: &str = r"
                    <dependency>
                        <groupId>org.apache.turbine</groupId>
                        <artifactId>turbine</artifactId>
                        <version>5.1</version>
                    </dependency>";

    const TURBINE_EXCLUDING: &str = r"
                    <dependency>
                        <groupId>org.apache.turbine</groupId>
                        <artifactId>turbine</artifactId>
                        <version>5.1</version>
                        <exclusions>
                            <exclusion>
                                <!-- brought in by io.jenkins.plugins:commons-text-api -->
                                <groupId>org.apache.commons</groupId>
                                <artifactId>commons-text</artifactId>
                            </exclusion>
                        </exclusions>
                    </dependency>";

    fn turbine_resolver() -> Arc<dyn DependencyResolver> {
        Arc::new(StaticResolver::new().with(
            Coordinate::new("org.apache.turbine", "turbine"),
            [Coordinate::new("org.apache.commons", "commons-text")],
        ))
    }

    #[test]
    fn replaces_direct_dependency_with_api_plugin() {
        assert_rewrite(&commons_text(), &parse_pom(&pom(COMMONS_TEXT)), &pom(API_PLUGIN));
    }

    #[test]
    fn excludes_transitives_from_bundled_library() {
        let recipe = commons_text().with_resolver(turbine_resolver());
        assert_rewrite(
            &recipe,
            &parse_pom(&pom(TURBINE)),
            &pom(&format!("{API_PLUGIN}{TURBINE_EXCLUDING}")),
        );
    }

    #[test]
    fn direct_and_transitive_in_one_pass() {
        let recipe = commons_text().with_resolver(turbine_resolver());
        assert_rewrite(
            &recipe,
            &parse_pom(&pom(&format!("{COMMONS_TEXT}{TURBINE}"))),
            &pom(&format!("{API_PLUGIN}{TURBINE_EXCLUDING}")),
        );
    }

    #[test]
    fn unrelated_dependencies_are_unchanged() {
        assert_unchanged(&commons_text(), &parse_pom(&pom(TURBINE)));
    }

    #[test]
    fn options_are_validated() {
        let mut options = ReplaceLibrariesWithApiPluginOptions {
            plugin_group_id: "io.jenkins.plugins".into(),
            plugin_artifact_id: "commons-text-api".into(),
            plugin_version: String::new(),
            replaces: vec![Library::new("org.apache.commons", "commons-text")],
        };
        assert!(ReplaceLibrariesWithApiPlugin::new(&options).is_err());
        options.plugin_version = "1".into();
        options.replaces.clear();
        assert!(ReplaceLibrariesWithApiPlugin::new(&options).is_err());
    }
}
