//! Library Substitution Table
//!
//! A [`SubstitutionRule`] says: the libraries in this set are now shipped by
//! one replacement artifact (typically a Jenkins "API plugin"). Applying a
//! rule to a POM means
//!
//! - direct dependencies on a bundled library give way to the replacement,
//! - every other dependency that still drags a bundled library in
//!   transitively gets an exclusion for it,
//! - nothing ever excludes the replacement itself.
//!
//! Exclusions are kept as an [`ExclusionSet`] per dependency: adding is a set
//! union keyed by coordinate, so running several rules over the same POM
//! never duplicates an entry.

use crate::coordinate::{Coordinate, CoordinateError};
use crate::pom::Dependency;
use crate::resolution::DependencyResolver;
use indexmap::IndexSet;
use jpm_tree::NodePath;

/// Replacement artifact plus the libraries it bundles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionRule {
    replacement: Coordinate,
    bundled: IndexSet<Coordinate>,
}

impl SubstitutionRule {
    /// Build a rule
    ///
    /// Versions on bundled coordinates are dropped; the replacement's own
    /// coordinate is never kept in the bundled set.
    ///
    /// # Errors
    /// Returns [`CoordinateError::MissingVersion`] when the replacement has no version.
    pub fn new(
        replacement: Coordinate,
        bundled: impl IntoIterator<Item = Coordinate>,
    ) -> Result<Self, CoordinateError> {
        if replacement.version.as_deref().is_none_or(|v| v.trim().is_empty()) {
            return Err(CoordinateError::MissingVersion(replacement.to_string()));
        }
        let bundled = bundled
            .into_iter()
            .map(|c| c.unversioned())
            .filter(|c| *c != replacement)
            .collect();
        Ok(Self { replacement, bundled })
    }

    /// The artifact that takes over
    #[inline]
    #[must_use]
    pub fn replacement(&self) -> &Coordinate {
        &self.replacement
    }

    /// Libraries shipped by the replacement
    #[inline]
    #[must_use]
    pub fn bundled(&self) -> &IndexSet<Coordinate> {
        &self.bundled
    }

    /// Whether `coordinate` is one of the bundled libraries
    #[must_use]
    pub fn bundles(&self, coordinate: &Coordinate) -> bool {
        self.bundled.contains(coordinate)
    }

    /// Whether `coordinate` is the replacement artifact
    #[must_use]
    pub fn is_replacement(&self, coordinate: &Coordinate) -> bool {
        *coordinate == self.replacement
    }

    /// Work out every edit the rule implies for a dependency list
    #[must_use]
    pub fn plan(&self, dependencies: &[Dependency], resolver: &dyn DependencyResolver) -> SubstitutionPlan {
        let has_replacement = dependencies.iter().any(|d| self.is_replacement(&d.coordinate));
        let direct: Vec<NodePath> = dependencies
            .iter()
            .filter(|d| self.bundles(&d.coordinate))
            .map(|d| d.path.clone())
            .collect();

        let mut exclusions = Vec::new();
        let mut pulled_in = false;
        for dependency in dependencies {
            if self.bundles(&dependency.coordinate) || self.is_replacement(&dependency.coordinate) {
                continue;
            }
            let transitive = resolver.transitive(&dependency.coordinate);
            let needed: Vec<Coordinate> = self
                .bundled
                .iter()
                .filter(|b| transitive.contains(*b))
                .cloned()
                .collect();
            if needed.is_empty() {
                continue;
            }
            pulled_in = true;
            let mut existing = ExclusionSet::from_iter(dependency.exclusions.iter().cloned());
            let missing = existing.union(needed);
            if !missing.is_empty() {
                exclusions.push(ExclusionEdit {
                    dependency: dependency.path.clone(),
                    coordinate: dependency.coordinate.clone(),
                    exclude: missing,
                });
            }
        }

        SubstitutionPlan {
            replace: if has_replacement { None } else { direct.first().cloned() },
            remove: if has_replacement { direct } else { direct.into_iter().skip(1).collect() },
            insert_replacement: !has_replacement && pulled_in && !self.any_direct(dependencies),
            exclusions,
        }
    }

    fn any_direct(&self, dependencies: &[Dependency]) -> bool {
        dependencies.iter().any(|d| self.bundles(&d.coordinate))
    }
}

/// Exclusions to add to one dependency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionEdit {
    /// Path of the `<dependency>` element
    pub dependency: NodePath,
    /// The dependency being given exclusions
    pub coordinate: Coordinate,
    /// Exclusions not yet present, in rule order
    pub exclude: Vec<Coordinate>,
}

/// Everything a rule wants changed in one POM
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubstitutionPlan {
    /// Direct dependency to rewrite in place into the replacement
    pub replace: Option<NodePath>,
    /// Further direct dependencies on bundled libraries to drop
    pub remove: Vec<NodePath>,
    /// Whether the replacement must be added as a new dependency
    pub insert_replacement: bool,
    /// Exclusions to add to other dependencies
    pub exclusions: Vec<ExclusionEdit>,
}

impl SubstitutionPlan {
    /// Whether the plan changes nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.replace.is_none() && self.remove.is_empty() && !self.insert_replacement && self.exclusions.is_empty()
    }
}

/// Set of excluded coordinates on one dependency
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExclusionSet {
    entries: IndexSet<Coordinate>,
}

impl ExclusionSet {
    /// Empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `coordinate` is excluded
    #[must_use]
    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        self.entries.contains(coordinate)
    }

    /// Add one exclusion; `false` if it was already present
    pub fn insert(&mut self, coordinate: Coordinate) -> bool {
        self.entries.insert(coordinate.unversioned())
    }

    /// Add every coordinate, returning those that were new
    pub fn union(&mut self, coordinates: impl IntoIterator<Item = Coordinate>) -> Vec<Coordinate> {
        coordinates
            .into_iter()
            .filter_map(|c| {
                let c = c.unversioned();
                self.entries.insert(c.clone()).then_some(c)
            })
            .collect()
    }

    /// Excluded coordinates in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Coordinate> {
        self.entries.iter()
    }

    /// Number of exclusions
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is excluded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<Coordinate> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = Coordinate>>(iter: I) -> Self {
        let mut set = Self::new();
        set.union(iter);
        set
    }
}

/// Lookup of substitution rules by bundled library
#[derive(Debug, Clone, Default)]
pub struct SubstitutionTable {
    rules: Vec<SubstitutionRule>,
}

impl SubstitutionTable {
    /// Empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule
    #[must_use]
    pub fn with_rule(mut self, rule: SubstitutionRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Rule whose replacement bundles `library`
    #[must_use]
    pub fn rule_for(&self, library: &Coordinate) -> Option<&SubstitutionRule> {
        self.rules.iter().find(|r| r.bundles(library))
    }

    /// All rules in insertion order
    pub fn rules(&self) -> impl Iterator<Item = &SubstitutionRule> {
        self.rules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolution::{NoResolver, StaticResolver};

    fn c(s: &str) -> Coordinate {
        Coordinate::parse(s).unwrap()
    }

    fn rule() -> SubstitutionRule {
        SubstitutionRule::new(
            c("io.jenkins.plugins:commons-text-api:1.9-5.v7ea_44fe6061c"),
            [c("org.apache.commons:commons-text")],
        )
        .unwrap()
    }

    fn dep(index: usize, coordinate: &str, exclusions: &[&str]) -> Dependency {
        Dependency {
            path: NodePath::new([0, index]),
            coordinate: c(coordinate),
            scope: None,
            kind: None,
            exclusions: exclusions.iter().map(|e| c(e)).collect(),
            exclusions_path: None,
        }
    }

    fn turbine_resolver() -> StaticResolver {
        StaticResolver::new().with(c("org.apache.turbine:turbine"), [c("org.apache.commons:commons-text")])
    }

    #[test]
    fn replacement_needs_a_version() {
        assert!(matches!(
            SubstitutionRule::new(c("io.jenkins.plugins:x-api"), []),
            Err(CoordinateError::MissingVersion(_))
        ));
    }

    #[test]
    fn replacement_is_never_bundled() {
        let rule = SubstitutionRule::new(c("g:api:1"), [c("g:api"), c("g:lib")]).unwrap();
        assert_eq!(rule.bundled().len(), 1);
        assert!(!rule.bundles(&c("g:api")));
    }

    #[test]
    fn direct_dependency_is_replaced_in_place() {
        let plan = rule().plan(&[dep(1, "org.apache.commons:commons-text:1.9", &[])], &NoResolver);
        assert_eq!(plan.replace, Some(NodePath::new([0, 1])));
        assert!(plan.remove.is_empty());
        assert!(!plan.insert_replacement);
    }

    #[test]
    fn transitive_use_adds_replacement_and_exclusion() {
        let plan = rule().plan(&[dep(1, "org.apache.turbine:turbine:5.1", &[])], &turbine_resolver());
        assert_eq!(plan.replace, None);
        assert!(plan.insert_replacement);
        assert_eq!(plan.exclusions.len(), 1);
        assert_eq!(plan.exclusions[0].exclude, vec![c("org.apache.commons:commons-text")]);
    }

    #[test]
    fn existing_exclusion_is_not_duplicated() {
        let deps = [
            dep(1, "io.jenkins.plugins:commons-text-api:1.9-5.v7ea_44fe6061c", &[]),
            dep(3, "org.apache.turbine:turbine:5.1", &["org.apache.commons:commons-text"]),
        ];
        assert!(rule().plan(&deps, &turbine_resolver()).is_empty());
    }

    #[test]
    fn replacement_present_removes_direct_copies() {
        let deps = [
            dep(1, "io.jenkins.plugins:commons-text-api:1", &[]),
            dep(3, "org.apache.commons:commons-text:1.9", &[]),
        ];
        let plan = rule().plan(&deps, &NoResolver);
        assert_eq!(plan.replace, None);
        assert_eq!(plan.remove, vec![NodePath::new([0, 3])]);
    }

    #[test]
    fn exclusion_set_is_a_union() {
        let mut set: ExclusionSet = [c("a:a:1"), c("a:a:2")].into_iter().collect();
        assert_eq!(set.len(), 1);
        assert_eq!(set.union([c("a:a"), c("b:b")]), vec![c("b:b")]);
        assert!(!set.insert(c("b:b")));
        assert_eq!(set.iter().count(), 2);
    }

    #[test]
    fn table_finds_rule_by_library() {
        let table = SubstitutionTable::new().with_rule(rule());
        assert!(table.rule_for(&c("org.apache.commons:commons-text:1.10")).is_some());
        assert!(table.rule_for(&c("org.apache.commons:commons-lang3")).is_none());
        assert_eq!(table.rules().count(), 1);
    }
}
