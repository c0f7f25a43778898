//! Typed read view over a POM document
//!
//! [`PomView`] answers the questions recipes ask of a `pom.xml` (which
//! properties exist, what the parent is, which dependencies are declared)
//! and hands back the [`NodePath`] of every element it reports so the caller
//! can edit exactly that node.

use crate::coordinate::Coordinate;
use jpm_tree::{Element, MatchError, Matchable, NodePath, XmlDocument, XmlPattern};
use std::collections::HashMap;

/// Parent POM every Jenkins plugin inherits from
pub const PLUGIN_PARENT: (&str, &str) = ("org.jenkins-ci.plugins", "plugin");

/// Property holding the minimum Jenkins core version
pub const JENKINS_VERSION_PROPERTY: &str = "jenkins.version";

/// Property some plugins use to derive `jenkins.version`
pub const JENKINS_BASELINE_PROPERTY: &str = "jenkins.baseline";

/// Interpolation passes before giving up on nested references
const MAX_INTERPOLATION_DEPTH: usize = 8;

/// One entry under `<properties>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Element name
    pub name: String,
    /// Raw text, not interpolated
    pub value: String,
    /// Path of the property element
    pub path: NodePath,
}

/// The `<parent>` block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    /// Parent coordinate including its version when declared
    pub coordinate: Coordinate,
    /// Path of `<parent>`
    pub path: NodePath,
    /// Path of `<parent><version>`
    pub version_path: Option<NodePath>,
    /// Path of `<parent><relativePath>`
    pub relative_path: Option<NodePath>,
}

/// A `<dependency>` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Path of the `<dependency>` element
    pub path: NodePath,
    /// Declared coordinate, version as written
    pub coordinate: Coordinate,
    /// `<scope>`, when present
    pub scope: Option<String>,
    /// `<type>`, when present
    pub kind: Option<String>,
    /// Coordinates listed under `<exclusions>`
    pub exclusions: Vec<Coordinate>,
    /// Path of `<exclusions>`, when present
    pub exclusions_path: Option<NodePath>,
}

impl Dependency {
    /// Path of the `<version>` child, when declared
    #[must_use]
    pub fn version_path(&self, pom: &PomView<'_>) -> Option<NodePath> {
        let element = pom.document().element_at(&self.path)?;
        element.child_index("version").map(|i| self.path.child(i))
    }

    /// Whether this is an import-scoped BOM entry
    #[must_use]
    pub fn is_bom_import(&self) -> bool {
        self.scope.as_deref() == Some("import") && self.kind.as_deref() == Some("pom")
    }
}

/// Read-only POM accessor
#[derive(Debug, Clone, Copy)]
pub struct PomView<'a> {
    document: &'a XmlDocument,
}

impl<'a> PomView<'a> {
    /// View over `document`
    #[must_use]
    pub fn new(document: &'a XmlDocument) -> Self {
        Self { document }
    }

    /// The underlying document
    #[inline]
    #[must_use]
    pub fn document(&self) -> &'a XmlDocument {
        self.document
    }

    /// Whether the root element is `<project>`
    #[must_use]
    pub fn is_project(&self) -> bool {
        self.document.root().name() == "project"
    }

    fn root_child(&self, name: &str) -> Option<(NodePath, &'a Element)> {
        let root = self.document.root();
        let index = root.child_index(name)?;
        let element = root.children().get(index)?.as_element()?;
        Some((NodePath::new([index]), element))
    }

    /// `<artifactId>` of the project
    #[must_use]
    pub fn artifact_id(&self) -> Option<String> {
        self.document.root().child_text("artifactId")
    }

    /// `<groupId>` of the project, inherited from the parent when absent
    #[must_use]
    pub fn group_id(&self) -> Option<String> {
        self.document
            .root()
            .child_text("groupId")
            .or_else(|| self.parent().map(|p| p.coordinate.group_id))
    }

    /// `<description>` of the project
    #[must_use]
    pub fn description(&self) -> Option<String> {
        self.document.root().child_text("description")
    }

    /// Path of `<properties>`
    #[must_use]
    pub fn properties_path(&self) -> Option<NodePath> {
        self.root_child("properties").map(|(path, _)| path)
    }

    /// All properties in document order
    #[must_use]
    pub fn properties(&self) -> Vec<Property> {
        let Some((path, properties)) = self.root_child("properties") else {
            return Vec::new();
        };
        properties
            .child_elements()
            .map(|(i, e)| Property {
                name: e.name().to_string(),
                value: e.text().unwrap_or_default(),
                path: path.child(i),
            })
            .collect()
    }

    /// The property called `name`
    ///
    /// # Errors
    /// Returns [`MatchError::Ambiguous`] when the property is declared more
    /// than once, and [`MatchError::InvalidPattern`] when `name` is not an
    /// element name.
    pub fn property(&self, name: &str) -> Result<Option<Property>, MatchError> {
        let pattern = XmlPattern::parse(&format!("/project/properties/{name}"))?;
        Ok(self.document.find_one(&pattern)?.map(|found| Property {
            name: name.to_string(),
            value: found.node.text().unwrap_or_default(),
            path: found.path,
        }))
    }

    /// Interpolated value of the property called `name`
    ///
    /// # Errors
    /// Same as [`PomView::property`].
    pub fn property_value(&self, name: &str) -> Result<Option<String>, MatchError> {
        Ok(self.property(name)?.map(|p| self.interpolate(&p.value)))
    }

    /// The `<parent>` block
    #[must_use]
    pub fn parent(&self) -> Option<ParentRef> {
        let (path, parent) = self.root_child("parent")?;
        let group_id = parent.child_text("groupId")?;
        let artifact_id = parent.child_text("artifactId")?;
        let mut coordinate = Coordinate::new(group_id, artifact_id);
        if let Some(version) = parent.child_text("version") {
            coordinate = coordinate.with_version(version);
        }
        Some(ParentRef {
            coordinate,
            version_path: parent.child_index("version").map(|i| path.child(i)),
            relative_path: parent.child_index("relativePath").map(|i| path.child(i)),
            path,
        })
    }

    /// Whether the parent is the Jenkins plugin parent POM
    #[must_use]
    pub fn has_plugin_parent(&self) -> bool {
        self.parent()
            .is_some_and(|p| p.coordinate.is(PLUGIN_PARENT.0, PLUGIN_PARENT.1))
    }

    /// `<packaging>` of the project, `jar` when absent
    #[must_use]
    pub fn packaging(&self) -> String {
        self.document
            .root()
            .child_text("packaging")
            .map_or_else(|| "jar".to_string(), |p| p.trim().to_string())
    }

    /// Whether this POM builds a Jenkins plugin
    ///
    /// The plugin parent manages `jenkins-core` for its children, so a
    /// plugin need not declare `jenkins.version` itself.
    #[must_use]
    pub fn is_jenkins_plugin(&self) -> bool {
        self.has_plugin_parent() || self.packaging() == "hpi"
    }

    /// Interpolated `jenkins.version`, when declared
    ///
    /// # Errors
    /// Same as [`PomView::property`].
    pub fn jenkins_version(&self) -> Result<Option<String>, MatchError> {
        self.property_value(JENKINS_VERSION_PROPERTY)
    }

    /// Path of `<dependencies>` directly under the project
    #[must_use]
    pub fn dependencies_path(&self) -> Option<NodePath> {
        self.root_child("dependencies").map(|(path, _)| path)
    }

    /// Path of `<dependencyManagement>`
    #[must_use]
    pub fn dependency_management_path(&self) -> Option<NodePath> {
        self.root_child("dependencyManagement").map(|(path, _)| path)
    }

    /// Path of `<dependencyManagement><dependencies>`
    #[must_use]
    pub fn managed_dependencies_path(&self) -> Option<NodePath> {
        let (path, management) = self.root_child("dependencyManagement")?;
        management.child_index("dependencies").map(|i| path.child(i))
    }

    /// Direct dependencies in document order
    #[must_use]
    pub fn dependencies(&self) -> Vec<Dependency> {
        self.dependencies_path()
            .map(|path| self.dependencies_under(&path))
            .unwrap_or_default()
    }

    /// Managed dependencies in document order
    #[must_use]
    pub fn managed_dependencies(&self) -> Vec<Dependency> {
        self.managed_dependencies_path()
            .map(|path| self.dependencies_under(&path))
            .unwrap_or_default()
    }

    fn dependencies_under(&self, path: &NodePath) -> Vec<Dependency> {
        let Some(container) = self.document.element_at(path) else {
            return Vec::new();
        };
        container
            .children_named("dependency")
            .filter_map(|(i, e)| read_dependency(path.child(i), e))
            .collect()
    }

    /// Resolve `${name}` references against the project's properties
    ///
    /// `project.groupId`, `project.artifactId` and `project.version` resolve
    /// to the project's own coordinates. Unknown references are left as is.
    #[must_use]
    pub fn interpolate(&self, text: &str) -> String {
        if !text.contains("${") {
            return text.to_string();
        }
        let mut values: HashMap<String, String> =
            self.properties().into_iter().map(|p| (p.name, p.value)).collect();
        let root = self.document.root();
        for (key, child) in [
            ("project.groupId", "groupId"),
            ("project.artifactId", "artifactId"),
            ("project.version", "version"),
        ] {
            if let Some(value) = root.child_text(child) {
                values.entry(key.to_string()).or_insert(value);
            }
        }
        let mut current = text.to_string();
        for _ in 0..MAX_INTERPOLATION_DEPTH {
            let next = substitute(&current, &values);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }
}

fn substitute(text: &str, values: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let key = &after[..end];
                match values.get(key) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push_str("${");
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn read_dependency(path: NodePath, element: &Element) -> Option<Dependency> {
    let group_id = element.child_text("groupId")?;
    let artifact_id = element.child_text("artifactId")?;
    let mut coordinate = Coordinate::new(group_id, artifact_id);
    if let Some(version) = element.child_text("version") {
        coordinate = coordinate.with_version(version);
    }
    let exclusions_index = element.child_index("exclusions");
    let exclusions = exclusions_index
        .and_then(|i| element.children().get(i))
        .and_then(|node| node.as_element())
        .map(|block| {
            block
                .children_named("exclusion")
                .filter_map(|(_, e)| Some(Coordinate::new(e.child_text("groupId")?, e.child_text("artifactId")?)))
                .collect()
        })
        .unwrap_or_default();
    Some(Dependency {
        exclusions_path: exclusions_index.map(|i| path.child(i)),
        coordinate,
        scope: element.child_text("scope"),
        kind: element.child_text("type"),
        exclusions,
        path,
    })
}
