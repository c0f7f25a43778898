//! JPM Recipe Catalog
//!
//! Recipes that move Jenkins plugins onto newer parents, cores and APIs.
//!
//! # Catalog
//!
//! - [`UpgradeVersionProperty`]: Raise a `<properties>` entry, inserting it when missing
//! - [`UpgradeParentVersion`]: Raise one parent POM's version
//! - [`UpgradeParentPom`]: Plugin parent + `jenkins.version` + `<relativePath/>`
//! - [`DisableLocalResolutionForParentPom`]: Pin `<relativePath/>`
//! - [`ReplaceLibrariesWithApiPlugin`]: Library substitution with transitive exclusions
//! - [`AddPluginsBom`]: Import the plugins BOM matching the Jenkins line
//! - [`IsJenkinsPlugin`]: Mark plugin POMs
//! - [`CreateIndexJelly`] / [`AddJellyXmlDeclaration`]: Jelly view hygiene
//! - [`MigrateApi`]: Dual-root package moves with type and method renames
//!
//! Every recipe is idempotent: applying it to its own output is a no-op.
//!
//! # Example
//!
//! ```rust,ignore
//! use jpm_composition::Composer;
//! use jpm_recipes::RecipeConfig;
//!
//! let config: RecipeConfig = serde_json::from_str(
//!     r#"{ "recipe": "UpgradeParentPom", "parent_version": "4.40", "jenkins_version": "2.303.3" }"#,
//! )?;
//! let composer = Composer::new(vec![config.instantiate()?])?;
//! let report = composer.run(&sources);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod api_plugin;
pub mod bom;
pub mod config;
pub mod jelly;
pub mod marker;
pub mod migrate_api;
pub mod parent;
pub mod property;

mod pom_edit;

// Re-exports
pub use api_plugin::{Library, ReplaceLibrariesWithApiPlugin, ReplaceLibrariesWithApiPluginOptions};
pub use bom::{AddPluginsBom, AddPluginsBomOptions};
pub use config::{instantiate_all, RecipeConfig};
pub use jelly::{
    index_jelly_contents, AddJellyXmlDeclaration, CreateIndexJelly, INDEX_JELLY, JELLY_DECLARATION,
};
pub use marker::{IsJenkinsPlugin, IsJenkinsPluginOptions};
pub use migrate_api::{MethodRename, MigrateApi, MigrateApiOptions, TypeRename};
pub use parent::{
    DisableLocalResolutionForParentPom, UpgradeParentPom, UpgradeParentPomOptions, UpgradeParentVersion,
    UpgradeParentVersionOptions,
};
pub use property::{UpgradeVersionProperty, UpgradeVersionPropertyOptions};

/// Prelude module for common imports
pub mod prelude {
    //! Everything needed to configure and run the catalog
    pub use crate::RecipeConfig;
    pub use jpm_composition::{Composer, ComposerConfig, Recipe, RecipeError, RecipeResult};
    pub use jpm_tree::SourceFile;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
