//! Edits shared by the POM recipes
//!
//! Every helper reads the session's current document, so helpers can be
//! chained inside one recipe and each sees the previous helper's result.

use jpm_composition::RecipeError;
use jpm_maven::{schema, Coordinate, PomView, VersionString, JENKINS_BASELINE_PROPERTY};
use jpm_tree::{EditSession, Element, InsertPosition, NodePath, SourceFile, XmlDocument, XmlNode};

/// The XML document of a `pom.xml` whose root is `<project>`
pub(crate) fn pom_document(source: &SourceFile) -> Option<&XmlDocument> {
    if !source.is_pom() {
        return None;
    }
    source
        .document()
        .as_xml()
        .filter(|doc| PomView::new(doc).is_project())
}

/// Whether `name` can be used as an element name in a path pattern
pub(crate) fn is_element_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Whether `current` sorts strictly below `target`
///
/// # Errors
/// `current` must parse as a version.
pub(crate) fn is_behind(current: &str, target: &VersionString) -> Result<bool, RecipeError> {
    Ok(target.is_newer_than(&VersionString::parse(current)?))
}

/// Declared `jenkins.version` of a Jenkins plugin POM
///
/// `None` for other POMs and for plugins that leave the core version to
/// their parent.
pub(crate) fn plugin_jenkins_version(pom: &PomView<'_>) -> Result<Option<String>, RecipeError> {
    if !pom.is_jenkins_plugin() {
        return Ok(None);
    }
    Ok(pom.jenkins_version()?.filter(|v| !v.trim().is_empty()))
}

/// Raise property `key` to `target`, inserting it when absent
///
/// A value written as `${jenkins.baseline}.N` keeps that form: the baseline
/// property takes all but the last segment of `target`.
pub(crate) fn upgrade_property(
    session: &mut EditSession<XmlDocument>,
    key: &str,
    target: &VersionString,
) -> Result<(), RecipeError> {
    let pom = PomView::new(session.document());
    let Some(property) = pom.property(key)? else {
        return insert_property(session, key, target.as_str());
    };
    let current = pom.interpolate(&property.value);
    if !is_behind(&current, target)? {
        tracing::debug!(property = key, %current, %target, "already at or above target");
        return Ok(());
    }

    let reference = format!("${{{JENKINS_BASELINE_PROPERTY}}}");
    if property.value.contains(&reference) {
        if let (Some(baseline), Some(prefix)) = (pom.property(JENKINS_BASELINE_PROPERTY)?, target.without_last_segment())
        {
            session.set_text(&baseline.path, prefix)?;
            session.set_text(&property.path, &format!("{reference}.{}", target.last_segment()))?;
            return Ok(());
        }
    }
    session.set_text(&property.path, target.as_str())?;
    Ok(())
}

fn insert_property(session: &mut EditSession<XmlDocument>, key: &str, value: &str) -> Result<(), RecipeError> {
    let property = XmlNode::Element(Element::with_text(key, value));
    match PomView::new(session.document()).properties_path() {
        Some(path) => {
            session.insert_child(&path, property, &InsertPosition::Last)?;
        }
        None => {
            let block = Element::new("properties").with_node(property);
            session.insert_child(
                &NodePath::root(),
                XmlNode::Element(block),
                &schema::ordered(schema::project()),
            )?;
        }
    }
    Ok(())
}

/// Raise the version of parent `group:artifact` to `target`
///
/// Other parents are left alone. A parent without a version gets one.
pub(crate) fn upgrade_parent(
    session: &mut EditSession<XmlDocument>,
    group_id: &str,
    artifact_id: &str,
    target: &VersionString,
) -> Result<(), RecipeError> {
    let Some(parent) = PomView::new(session.document()).parent() else {
        return Ok(());
    };
    if !parent.coordinate.is(group_id, artifact_id) {
        return Ok(());
    }
    match (&parent.version_path, parent.coordinate.version.as_deref()) {
        (Some(path), Some(current)) => {
            if is_behind(current, target)? {
                session.set_text(path, target.as_str())?;
            } else {
                tracing::debug!(parent = %parent.coordinate, %target, "parent already at or above target");
            }
        }
        _ => {
            session.insert_child(
                &parent.path,
                XmlNode::Element(Element::with_text("version", target.as_str())),
                &schema::ordered(schema::parent()),
            )?;
        }
    }
    Ok(())
}

/// Make `<parent>` carry an empty `<relativePath/>`
pub(crate) fn disable_local_resolution(session: &mut EditSession<XmlDocument>) -> Result<(), RecipeError> {
    let Some(parent) = PomView::new(session.document()).parent() else {
        return Ok(());
    };
    let relative_path = XmlNode::Element(Element::new("relativePath"));
    match parent.relative_path {
        Some(path) => {
            let empty = session
                .document()
                .element_at(&path)
                .is_some_and(|e| e.children().iter().all(XmlNode::is_whitespace));
            if !empty {
                session.replace(&path, relative_path)?;
            }
        }
        None => {
            session.insert_child(&parent.path, relative_path, &schema::ordered(schema::parent()))?;
        }
    }
    Ok(())
}

/// `<dependency>` for `coordinate`, version included when known
pub(crate) fn dependency_element(coordinate: &Coordinate) -> Element {
    let element = Element::new("dependency")
        .with_child(Element::with_text("groupId", &coordinate.group_id))
        .with_child(Element::with_text("artifactId", &coordinate.artifact_id));
    match &coordinate.version {
        Some(version) => element.with_child(Element::with_text("version", version)),
        None => element,
    }
}

fn coordinate_of(element: &Element) -> Option<Coordinate> {
    Some(Coordinate::new(element.child_text("groupId")?, element.child_text("artifactId")?))
}

/// Add a direct dependency, keeping `<dependencies>` sorted by coordinate
pub(crate) fn insert_dependency(
    session: &mut EditSession<XmlDocument>,
    coordinate: &Coordinate,
) -> Result<(), RecipeError> {
    let dependency = dependency_element(coordinate);
    let Some(path) = PomView::new(session.document()).dependencies_path() else {
        let block = Element::new("dependencies").with_child(dependency);
        session.insert_child(
            &NodePath::root(),
            XmlNode::Element(block),
            &schema::ordered(schema::project()),
        )?;
        return Ok(());
    };
    let ordinal = session.document().element_at(&path).map_or(0, |container| {
        container
            .child_elements()
            .position(|(_, e)| coordinate_of(e).is_some_and(|c| &c > coordinate))
            .unwrap_or_else(|| container.child_elements().count())
    });
    session.insert_child(&path, XmlNode::Element(dependency), &InsertPosition::At(ordinal))?;
    Ok(())
}

/// Append an entry under `<dependencyManagement><dependencies>`, creating
/// whichever containers are missing
pub(crate) fn insert_managed_dependency(
    session: &mut EditSession<XmlDocument>,
    dependency: Element,
) -> Result<(), RecipeError> {
    let pom = PomView::new(session.document());
    if let Some(path) = pom.managed_dependencies_path() {
        session.insert_child(&path, XmlNode::Element(dependency), &InsertPosition::Last)?;
        return Ok(());
    }
    let dependencies = Element::new("dependencies").with_child(dependency);
    match pom.dependency_management_path() {
        Some(path) => {
            session.insert_child(&path, XmlNode::Element(dependencies), &InsertPosition::Last)?;
        }
        None => {
            let management = Element::new("dependencyManagement").with_child(dependencies);
            session.insert_child(
                &NodePath::root(),
                XmlNode::Element(management),
                &schema::ordered(schema::project()),
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jpm_test_utils::{dedent, parse_pom};
    use pretty_assertions::assert_eq;

    fn session(pom: &str) -> EditSession<XmlDocument> {
        let source = parse_pom(&dedent(pom));
        EditSession::new(source.document().as_xml().cloned().unwrap())
    }

    fn target(v: &str) -> VersionString {
        VersionString::parse(v).unwrap()
    }

    #[test]
    fn property_is_raised_and_never_lowered() {
        let mut s = session(
            r"
            <project>
                <properties>
                    <jenkins.version>2.303.1</jenkins.version>
                </properties>
            </project>",
        );
        upgrade_property(&mut s, "jenkins.version", &target("2.364.1")).unwrap();
        upgrade_property(&mut s, "jenkins.version", &target("2.361.4")).unwrap();
        assert_eq!(s.records().len(), 1);
        assert!(s.document().to_string().contains("<jenkins.version>2.364.1</jenkins.version>"));
    }

    #[test]
    fn baseline_reference_is_kept() {
        let mut s = session(
            r"
            <project>
                <properties>
                    <jenkins.baseline>2.303</jenkins.baseline>
                    <jenkins.version>${jenkins.baseline}.1</jenkins.version>
                </properties>
            </project>",
        );
        upgrade_property(&mut s, "jenkins.version", &target("2.452.4")).unwrap();
        let printed = s.document().to_string();
        assert!(printed.contains("<jenkins.baseline>2.452</jenkins.baseline>"));
        assert!(printed.contains("<jenkins.version>${jenkins.baseline}.4</jenkins.version>"));
    }

    #[test]
    fn missing_properties_block_is_created_in_schema_position() {
        let mut s = session(
            r"
            <project>
                <artifactId>a</artifactId>
                <dependencies/>
            </project>",
        );
        upgrade_property(&mut s, "jenkins.version", &target("2.303.3")).unwrap();
        assert_eq!(
            s.document().to_string(),
            dedent(
                r"
                <project>
                    <artifactId>a</artifactId>
                    <properties>
                        <jenkins.version>2.303.3</jenkins.version>
                    </properties>
                    <dependencies/>
                </project>"
            )
        );
    }

    #[test]
    fn malformed_current_version_is_reported() {
        let mut s = session(
            r"
            <project>
                <properties>
                    <jenkins.version>${missing}</jenkins.version>
                </properties>
            </project>",
        );
        let err = upgrade_property(&mut s, "jenkins.version", &target("2.303.3")).unwrap_err();
        assert!(err.is_not_applicable());
        assert!(!s.is_changed());
    }

    #[test]
    fn foreign_parent_is_ignored() {
        let mut s = session(
            r"
            <project>
                <parent>
                    <groupId>org.example</groupId>
                    <artifactId>parent</artifactId>
                    <version>1.0</version>
                </parent>
            </project>",
        );
        upgrade_parent(&mut s, "org.jenkins-ci.plugins", "plugin", &target("4.40")).unwrap();
        assert!(!s.is_changed());
    }

    #[test]
    fn relative_path_is_normalised() {
        let mut s = session(
            r"
            <project>
                <parent>
                    <groupId>org.jenkins-ci.plugins</groupId>
                    <artifactId>plugin</artifactId>
                    <version>4.40</version>
                    <relativePath>../pom.xml</relativePath>
                </parent>
            </project>",
        );
        disable_local_resolution(&mut s).unwrap();
        assert!(s.document().to_string().contains("<relativePath/>"));
        disable_local_resolution(&mut s).unwrap();
        assert_eq!(s.records().len(), 1);
    }

    #[test]
    fn dependency_lands_in_coordinate_order() {
        let mut s = session(
            r"
            <project>
                <dependencies>
                    <dependency>
                        <groupId>a.b</groupId>
                        <artifactId>first</artifactId>
                    </dependency>
                    <dependency>
                        <groupId>z.z</groupId>
                        <artifactId>last</artifactId>
                    </dependency>
                </dependencies>
            </project>",
        );
        insert_dependency(&mut s, &Coordinate::new("m.n", "middle").with_version("1")).unwrap();
        let deps = PomView::new(s.document()).dependencies();
        let names: Vec<&str> = deps.iter().map(|d| d.coordinate.artifact_id.as_str()).collect();
        assert_eq!(names, vec!["first", "middle", "last"]);
    }
}
