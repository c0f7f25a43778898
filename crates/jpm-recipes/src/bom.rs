//! Jenkins plugins BOM management

use crate::pom_edit::{insert_managed_dependency, plugin_jenkins_version, pom_document};
use jpm_composition::{Precedence, Recipe, RecipeError, RecipeResult};
use jpm_maven::{bom_name_for_jenkins_version, Coordinate, PomView, PLUGINS_BOM_GROUP_ID};
use jpm_tree::{EditSession, Element, SourceFile};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

const NAME: &str = "AddPluginsBom";

/// Options for [`AddPluginsBom`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddPluginsBomOptions {
    /// Version written when the BOM import is added
    pub bom_version: String,
    /// `groupId:artifactId` of every plugin the BOM manages
    pub managed_plugins: Vec<String>,
}

/// Adds or corrects the Jenkins plugins BOM import
///
/// The BOM artifact follows `jenkins.version`: `bom-<line>.x` for LTS
/// releases, `bom-weekly` otherwise. Plugin BOM imports for any other line
/// are removed, and direct dependencies on managed plugins lose their
/// explicit version. An import of the expected BOM is never re-versioned.
#[derive(Debug, Clone)]
pub struct AddPluginsBom {
    bom_version: String,
    managed: IndexSet<Coordinate>,
}

impl AddPluginsBom {
    /// Recipe importing the BOM at `bom_version`
    ///
    /// # Errors
    /// Returns [`RecipeError::InvalidConfiguration`] for a blank version and
    /// [`RecipeError::Coordinate`] for a malformed managed plugin.
    pub fn new<I, S>(bom_version: &str, managed_plugins: I) -> Result<Self, RecipeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if bom_version.trim().is_empty() {
            return Err(RecipeError::invalid_configuration(NAME, "bom_version is blank"));
        }
        let managed = managed_plugins
            .into_iter()
            .map(|p| Coordinate::parse(p.as_ref()).map(|c| c.unversioned()))
            .collect::<Result<IndexSet<_>, _>>()?;
        Ok(Self {
            bom_version: bom_version.trim().to_string(),
            managed,
        })
    }

    /// Build from options
    ///
    /// # Errors
    /// Same as [`AddPluginsBom::new`].
    pub fn from_options(options: &AddPluginsBomOptions) -> Result<Self, RecipeError> {
        Self::new(&options.bom_version, &options.managed_plugins)
    }

    /// Whether the BOM manages `coordinate`
    #[inline]
    #[must_use]
    pub fn manages(&self, coordinate: &Coordinate) -> bool {
        self.managed.contains(coordinate)
    }

    fn bom_import(&self, bom_name: &str) -> Element {
        Element::new("dependency")
            .with_child(Element::with_text("groupId", PLUGINS_BOM_GROUP_ID))
            .with_child(Element::with_text("artifactId", bom_name))
            .with_child(Element::with_text("version", &self.bom_version))
            .with_child(Element::with_text("type", "pom"))
            .with_child(Element::with_text("scope", "import"))
    }
}

impl Recipe for AddPluginsBom {
    fn name(&self) -> &str {
        NAME
    }

    fn display_name(&self) -> &str {
        "Add or correct Jenkins plugins BOM"
    }

    fn description(&self) -> &str {
        "Adds the Jenkins plugins BOM if the project depends on any managed plugin, and removes BOMs for other Jenkins lines."
    }

    fn precedence(&self) -> Precedence {
        Precedence::Structural
    }

    fn apply(&self, source: &SourceFile) -> Result<RecipeResult, RecipeError> {
        let Some(doc) = pom_document(source) else {
            return Ok(RecipeResult::Unchanged);
        };
        let pom = PomView::new(doc);
        let Some(jenkins_version) = plugin_jenkins_version(&pom)? else {
            return Ok(RecipeResult::Unchanged);
        };
        let bom_name = bom_name_for_jenkins_version(jenkins_version.trim());

        let found: Vec<_> = pom
            .dependencies()
            .into_iter()
            .filter(|d| self.manages(&d.coordinate))
            .collect();
        let boms: Vec<_> = pom
            .managed_dependencies()
            .into_iter()
            .filter(|d| d.coordinate.group_id == PLUGINS_BOM_GROUP_ID)
            .collect();
        if found.is_empty() && boms.is_empty() {
            return Ok(RecipeResult::Unchanged);
        }

        let versions: Vec<_> = found.iter().filter_map(|d| d.version_path(&pom)).collect();
        let mismatched: Vec<_> = boms
            .iter()
            .filter(|d| d.coordinate.artifact_id != bom_name && d.is_bom_import())
            .map(|d| d.path.clone())
            .collect();
        let has_expected = boms.iter().any(|d| d.coordinate.artifact_id == bom_name);

        let mut session = EditSession::new(doc.clone());
        for path in &versions {
            session.remove(path)?;
        }
        for path in mismatched.iter().rev() {
            tracing::debug!(bom = %bom_name, at = %path, "removing mismatched plugins BOM");
            session.remove(path)?;
        }
        if !has_expected {
            insert_managed_dependency(&mut session, self.bom_import(&bom_name))?;
        }
        Ok(RecipeResult::from_session(session))
    }
}
