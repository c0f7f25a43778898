//! Jenkins-specific naming rules

use once_cell::sync::Lazy;
use regex::Regex;

/// groupId of the Jenkins plugins BOMs
pub const PLUGINS_BOM_GROUP_ID: &str = "io.jenkins.tools.bom";

/// BOM tracking the weekly release line
pub const WEEKLY_BOM: &str = "bom-weekly";

static LTS_VERSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d\.\d+\.\d$").expect("static regex"));

/// Whether `version` names an LTS release such as `2.361.4`
#[must_use]
pub fn is_lts(version: &str) -> bool {
    LTS_VERSION.is_match(version)
}

/// Plugins BOM artifactId matching a Jenkins core version
///
/// LTS releases map to their line (`2.361.4` → `bom-2.361.x`); anything else
/// is assumed to be recent and gets [`WEEKLY_BOM`].
#[must_use]
pub fn bom_name_for_jenkins_version(version: &str) -> String {
    match version.rsplit_once('.') {
        Some((line, _)) if is_lts(version) => format!("bom-{line}.x"),
        _ => WEEKLY_BOM.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lts_versions_map_to_their_line() {
        for (version, bom) in [
            ("2.277.3", "bom-2.277.x"),
            ("2.319.1", "bom-2.319.x"),
            ("2.361.4", "bom-2.361.x"),
            ("2.401.2", "bom-2.401.x"),
        ] {
            assert_eq!(bom_name_for_jenkins_version(version), bom, "{version}");
        }
    }

    #[test]
    fn everything_else_is_weekly() {
        for version in ["2.384", "2.401", "888888-SNAPSHOT", "2.379-rc33114.2f90818f6a_35", ""] {
            assert_eq!(bom_name_for_jenkins_version(version), WEEKLY_BOM, "{version}");
        }
    }
}
