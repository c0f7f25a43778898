//! Declarative recipe configuration
//!
//! A [`RecipeConfig`] names a recipe and carries its options, so a run can be
//! described as data (JSON, or any other serde format) and turned into
//! recipe objects for the composer.

use crate::api_plugin::{ReplaceLibrariesWithApiPlugin, ReplaceLibrariesWithApiPluginOptions};
use crate::bom::{AddPluginsBom, AddPluginsBomOptions};
use crate::jelly::{AddJellyXmlDeclaration, CreateIndexJelly};
use crate::marker::{IsJenkinsPlugin, IsJenkinsPluginOptions};
use crate::migrate_api::{MigrateApi, MigrateApiOptions};
use crate::parent::{
    DisableLocalResolutionForParentPom, UpgradeParentPom, UpgradeParentPomOptions, UpgradeParentVersion,
    UpgradeParentVersionOptions,
};
use crate::property::{UpgradeVersionProperty, UpgradeVersionPropertyOptions};
use jpm_composition::{Recipe, RecipeError};
use jpm_maven::{DependencyResolver, NoResolver};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One configured recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "recipe")]
pub enum RecipeConfig {
    /// [`UpgradeVersionProperty`]
    UpgradeVersionProperty(UpgradeVersionPropertyOptions),
    /// [`UpgradeParentVersion`]
    UpgradeParentVersion(UpgradeParentVersionOptions),
    /// [`UpgradeParentPom`]
    UpgradeParentPom(UpgradeParentPomOptions),
    /// [`DisableLocalResolutionForParentPom`]
    DisableLocalResolutionForParentPom,
    /// [`ReplaceLibrariesWithApiPlugin`]
    ReplaceLibrariesWithApiPlugin(ReplaceLibrariesWithApiPluginOptions),
    /// [`AddPluginsBom`]
    AddPluginsBom(AddPluginsBomOptions),
    /// [`IsJenkinsPlugin`]
    IsJenkinsPlugin(IsJenkinsPluginOptions),
    /// [`CreateIndexJelly`]
    CreateIndexJelly,
    /// [`AddJellyXmlDeclaration`]
    AddJellyXmlDeclaration,
    /// [`MigrateApi`] with explicit options
    MigrateApi(MigrateApiOptions),
    /// [`MigrateApi::htmlunit_3`]
    UpgradeHtmlUnit3,
    /// [`MigrateApi::javax_annotations_to_spotbugs`]
    JavaxAnnotationsToSpotbugs,
    /// [`MigrateApi::hudson_util_time_span`]
    UtilGetPastTimeStringToGetTimeSpanString,
}

impl RecipeConfig {
    /// Build the recipe, resolving nothing transitively
    ///
    /// # Errors
    /// Returns [`RecipeError::InvalidConfiguration`] or
    /// [`RecipeError::Coordinate`] when the options are unusable.
    pub fn instantiate(&self) -> Result<Arc<dyn Recipe>, RecipeError> {
        self.instantiate_with(Arc::new(NoResolver))
    }

    /// Build the recipe; library substitution looks up transitive
    /// dependencies through `resolver`
    ///
    /// # Errors
    /// Same as [`RecipeConfig::instantiate`].
    pub fn instantiate_with(&self, resolver: Arc<dyn DependencyResolver>) -> Result<Arc<dyn Recipe>, RecipeError> {
        let recipe: Arc<dyn Recipe> = match self {
            Self::UpgradeVersionProperty(o) => Arc::new(UpgradeVersionProperty::from_options(o)?),
            Self::UpgradeParentVersion(o) => Arc::new(UpgradeParentVersion::from_options(o)?),
            Self::UpgradeParentPom(o) => Arc::new(UpgradeParentPom::from_options(o)?),
            Self::DisableLocalResolutionForParentPom => Arc::new(DisableLocalResolutionForParentPom::new()),
            Self::ReplaceLibrariesWithApiPlugin(o) => {
                Arc::new(ReplaceLibrariesWithApiPlugin::new(o)?.with_resolver(resolver))
            }
            Self::AddPluginsBom(o) => Arc::new(AddPluginsBom::from_options(o)?),
            Self::IsJenkinsPlugin(o) => Arc::new(IsJenkinsPlugin::from_options(o)?),
            Self::CreateIndexJelly => Arc::new(CreateIndexJelly::new()),
            Self::AddJellyXmlDeclaration => Arc::new(AddJellyXmlDeclaration::new()),
            Self::MigrateApi(o) => Arc::new(MigrateApi::new(o)?),
            Self::UpgradeHtmlUnit3 => Arc::new(MigrateApi::htmlunit_3()),
            Self::JavaxAnnotationsToSpotbugs => Arc::new(MigrateApi::javax_annotations_to_spotbugs()),
            Self::UtilGetPastTimeStringToGetTimeSpanString => Arc::new(MigrateApi::hudson_util_time_span()),
        };
        tracing::debug!(recipe = recipe.name(), "instantiated");
        Ok(recipe)
    }
}

/// Build every configured recipe, sharing one resolver
///
/// # Errors
/// The first configuration error, in declaration order.
pub fn instantiate_all(
    configs: &[RecipeConfig],
    resolver: &Arc<dyn DependencyResolver>,
) -> Result<Vec<Arc<dyn Recipe>>, RecipeError> {
    configs.iter().map(|c| c.instantiate_with(Arc::clone(resolver))).collect()
}
