//! Conventional child ordering of POM elements
//!
//! Follows the element order of the Maven 4.0.0 POM reference so inserted
//! elements land where a maintainer would have written them.

use jpm_tree::{ChildOrder, InsertPosition};

/// Children of `<project>`
#[must_use]
pub fn project() -> ChildOrder {
    ChildOrder::new([
        "modelVersion",
        "parent",
        "groupId",
        "artifactId",
        "version",
        "packaging",
        "name",
        "description",
        "url",
        "inceptionYear",
        "organization",
        "licenses",
        "developers",
        "contributors",
        "mailingLists",
        "prerequisites",
        "modules",
        "scm",
        "issueManagement",
        "ciManagement",
        "distributionManagement",
        "properties",
        "dependencyManagement",
        "dependencies",
        "repositories",
        "pluginRepositories",
        "build",
        "reporting",
        "profiles",
    ])
}

/// Children of `<parent>`
#[must_use]
pub fn parent() -> ChildOrder {
    ChildOrder::new(["groupId", "artifactId", "version", "relativePath"])
}

/// Children of `<dependency>`
#[must_use]
pub fn dependency() -> ChildOrder {
    ChildOrder::new([
        "groupId",
        "artifactId",
        "version",
        "type",
        "classifier",
        "scope",
        "systemPath",
        "exclusions",
        "optional",
    ])
}

/// Children of `<exclusion>`
#[must_use]
pub fn exclusion() -> ChildOrder {
    ChildOrder::new(["groupId", "artifactId"])
}

/// Insert position following `order`
#[must_use]
pub fn ordered(order: ChildOrder) -> InsertPosition {
    InsertPosition::Ordered(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn properties_come_before_dependencies() {
        let order = project();
        assert!(order.rank("properties") < order.rank("dependencyManagement"));
        assert!(order.rank("dependencyManagement") < order.rank("dependencies"));
        assert!(order.rank("build") < order.rank("unknown"));
    }

    #[test]
    fn relative_path_closes_parent() {
        let order = parent();
        assert_eq!(order.rank("relativePath"), 3);
        assert!(dependency().rank("version") < dependency().rank("exclusions"));
    }
}
