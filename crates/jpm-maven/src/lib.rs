//! JPM Maven Model
//!
//! Maven-level knowledge shared by the recipe catalog.
//!
//! # Overview
//!
//! - **VersionString**: Dotted version value type with one total ordering
//! - **VersionRange**: Maven range syntax (`[2.361,2.400)`, `*`)
//! - **Coordinate**: `groupId:artifactId[:version]`, keyed on group and artifact
//! - **PomView**: Typed read access to a POM with node paths for editing
//! - **SubstitutionRule**: Replacement artifact plus exclusion bookkeeping
//!
//! # Example
//!
//! ```rust
//! use jpm_maven::VersionString;
//!
//! let current = VersionString::parse("4.40").unwrap();
//! let target = VersionString::parse("4.40.0").unwrap();
//! assert_eq!(current, target);
//! assert!(!target.is_newer_than(&current));
//! ```

pub mod coordinate;
pub mod jenkins;
pub mod pom;
pub mod range;
pub mod resolution;
pub mod schema;
pub mod substitution;
pub mod version;

// Re-exports
pub use coordinate::{Coordinate, CoordinateError};
pub use jenkins::{bom_name_for_jenkins_version, is_lts, PLUGINS_BOM_GROUP_ID, WEEKLY_BOM};
pub use pom::{
    Dependency, ParentRef, PomView, Property, JENKINS_BASELINE_PROPERTY, JENKINS_VERSION_PROPERTY, PLUGIN_PARENT,
};
pub use range::VersionRange;
pub use resolution::{DependencyResolver, NoResolver, StaticResolver};
pub use substitution::{ExclusionEdit, ExclusionSet, SubstitutionPlan, SubstitutionRule, SubstitutionTable};
pub use version::{compare, VersionError, VersionString};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for POM recipes
    pub use crate::{
        Coordinate, Dependency, DependencyResolver, PomView, SubstitutionRule, VersionRange, VersionString,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
