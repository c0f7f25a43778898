//! Maven coordinates
//!
//! A [`Coordinate`] is `groupId:artifactId[:version]`. Equality, hashing
//! and ordering use only the group and artifact, so a coordinate works as a
//! key in sets and maps regardless of which version a POM pins. Compare
//! versions explicitly with [`Coordinate::same_version`].

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Dependency or parent identity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    /// Maven groupId
    pub group_id: String,
    /// Maven artifactId
    pub artifact_id: String,
    /// Version, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Coordinate {
    /// Coordinate without a version
    #[must_use]
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: None,
        }
    }

    /// Copy with a version
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Copy without the version
    #[must_use]
    pub fn unversioned(&self) -> Self {
        Self::new(self.group_id.clone(), self.artifact_id.clone())
    }

    /// Parse `group:artifact` or `group:artifact:version`
    ///
    /// # Errors
    /// Returns [`CoordinateError`] for the wrong number of parts or empty parts.
    pub fn parse(text: &str) -> Result<Self, CoordinateError> {
        let parts: Vec<&str> = text.trim().split(':').collect();
        if !(2..=3).contains(&parts.len()) {
            return Err(CoordinateError::PartCount {
                coordinate: text.to_string(),
                found: parts.len(),
            });
        }
        if parts.iter().any(|p| p.trim().is_empty()) {
            return Err(CoordinateError::EmptyPart(text.to_string()));
        }
        let coordinate = Self::new(parts[0].trim(), parts[1].trim());
        Ok(match parts.get(2) {
            Some(version) => coordinate.with_version(version.trim()),
            None => coordinate,
        })
    }

    /// `group:artifact`
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }

    /// Whether group and artifact match
    #[must_use]
    pub fn is(&self, group_id: &str, artifact_id: &str) -> bool {
        self.group_id == group_id && self.artifact_id == artifact_id
    }

    /// Same identity and the same version (both absent counts as equal)
    #[must_use]
    pub fn same_version(&self, other: &Self) -> bool {
        self == other && self.version == other.version
    }
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.group_id == other.group_id && self.artifact_id == other.artifact_id
    }
}

impl Eq for Coordinate {}

impl Hash for Coordinate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.group_id.hash(state);
        self.artifact_id.hash(state);
    }
}

impl Ord for Coordinate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.group_id
            .cmp(&other.group_id)
            .then_with(|| self.artifact_id.cmp(&other.artifact_id))
    }
}

impl PartialOrd for Coordinate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)?;
        if let Some(version) = &self.version {
            write!(f, ":{version}")?;
        }
        Ok(())
    }
}

impl FromStr for Coordinate {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Errors parsing coordinates
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordinateError {
    /// Not two or three `:`-separated parts
    #[error("coordinate '{coordinate}' has {found} parts, expected group:artifact[:version]")]
    PartCount {
        /// The coordinate text
        coordinate: String,
        /// Parts found
        found: usize,
    },

    /// A part is blank
    #[error("coordinate '{0}' has an empty part")]
    EmptyPart(String),

    /// A coordinate that must carry a version does not
    #[error("coordinate '{0}' needs a version")]
    MissingVersion(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn parse_and_display() {
        let c = Coordinate::parse("io.jenkins.plugins:commons-text-api:1.9-5.v7ea_44fe6061c").unwrap();
        assert_eq!(c.group_id, "io.jenkins.plugins");
        assert_eq!(c.version.as_deref(), Some("1.9-5.v7ea_44fe6061c"));
        assert_eq!(c.to_string(), "io.jenkins.plugins:commons-text-api:1.9-5.v7ea_44fe6061c");
        assert_eq!(c.key(), "io.jenkins.plugins:commons-text-api");
    }

    #[test]
    fn parse_errors() {
        assert!(matches!(Coordinate::parse("a"), Err(CoordinateError::PartCount { found: 1, .. })));
        assert!(matches!(Coordinate::parse("a:b:c:d"), Err(CoordinateError::PartCount { found: 4, .. })));
        assert!(matches!(Coordinate::parse("a: "), Err(CoordinateError::EmptyPart(_))));
    }

    #[test]
    fn equality_ignores_version() {
        let a = Coordinate::new("g", "a").with_version("1");
        let b = Coordinate::new("g", "a").with_version("2");
        assert_eq!(a, b);
        assert!(!a.same_version(&b));
        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn ordering_is_group_then_artifact() {
        let mut coords = vec![
            Coordinate::new("org.apache.turbine", "turbine"),
            Coordinate::new("io.jenkins.plugins", "commons-text-api"),
            Coordinate::new("io.jenkins.plugins", "bouncycastle-api"),
        ];
        coords.sort();
        assert_eq!(coords[0].artifact_id, "bouncycastle-api");
        assert_eq!(coords[2].group_id, "org.apache.turbine");
    }

    #[test]
    fn serde_uses_maven_names() {
        let json = serde_json::to_string(&Coordinate::new("g", "a")).unwrap();
        assert_eq!(json, r#"{"groupId":"g","artifactId":"a"}"#);
    }
}
