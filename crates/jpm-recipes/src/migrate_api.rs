//! Package relocation with renamed types and methods
//!
//! A library that moved packages may be referenced from either its old
//! root or an intermediate one, depending on how far a project has been
//! migrated. [`MigrateApi`] recognises every configured root and moves all
//! of them to the target package in one pass, applying type and method
//! renames on the way.
//!
//! Method renames are declared against the target package. Each one becomes
//! a [`MethodMatcher`] that also accepts the same type under every legacy
//! root, so `a.getValueAttribute()` is renamed whether `a` is typed
//! `com.gargoylesoftware.htmlunit.html.HtmlInput` or
//! `org.htmlunit.html.HtmlInput`. A rename may also stand alone, with no
//! legacy packages, for a method deprecated in place.
//!
//! Types and receivers that only an on-demand import can supply are
//! attributed to the one imported package under which they have a rename.

use jpm_composition::{Precedence, Recipe, RecipeError, RecipeResult};
use jpm_tree::{
    relocate_name, EditSession, Import, InsertPosition, JavaDocument, JavaSegment, MethodMatcher, MethodName,
    NodePath, PackageMatcher, SourceFile, TypeRef,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const NAME: &str = "MigrateApi";

/// A type that changes name, given by fully-qualified names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRename {
    /// Old name, in any legacy package or the target package
    pub from: String,
    /// New name
    pub to: String,
}

/// A method that changes name on one declaring type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodRename {
    /// Declaring type under the target package
    pub declaring_type: String,
    /// Old method name
    pub from: String,
    /// New method name
    pub to: String,
}

/// Options for [`MigrateApi`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrateApiOptions {
    /// Package everything ends up in
    pub target_package: String,
    /// Roots the API may still be referenced from; may be empty when
    /// the migration only renames
    #[serde(default)]
    pub legacy_packages: Vec<String>,
    /// Types renamed in the move
    #[serde(default)]
    pub type_renames: Vec<TypeRename>,
    /// Methods renamed in the move
    #[serde(default)]
    pub method_renames: Vec<MethodRename>,
    /// Regroup imports after rewriting: rewritten ones first, sorted, then
    /// the rest after a blank line
    #[serde(default)]
    pub sort_imports: bool,
}

#[derive(Debug, Clone)]
struct CompiledMethodRename {
    matcher: MethodMatcher,
    to: String,
}

/// Moves an API to a new package, renaming types and methods
#[derive(Debug, Clone)]
pub struct MigrateApi {
    name: String,
    display_name: String,
    target: String,
    legacy: PackageMatcher,
    type_renames: Vec<TypeRename>,
    method_renames: Vec<CompiledMethodRename>,
    sort_imports: bool,
}

fn is_qualified_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .split('.')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$'))
}

fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

impl MigrateApi {
    /// Recipe built from options
    ///
    /// # Errors
    /// Returns [`RecipeError::InvalidConfiguration`] for malformed package or
    /// type names, a legacy package equal to the target, a method rename
    /// whose declaring type is outside the target package, or options that
    /// neither move nor rename anything.
    pub fn new(options: &MigrateApiOptions) -> Result<Self, RecipeError> {
        let invalid = |reason: String| RecipeError::invalid_configuration(NAME, reason);
        let target = options.target_package.trim();
        if !is_qualified_name(target) {
            return Err(invalid(format!("'{target}' is not a package name")));
        }
        if options.legacy_packages.is_empty() && options.type_renames.is_empty() && options.method_renames.is_empty() {
            return Err(invalid("nothing to migrate".to_string()));
        }
        let legacy = options
            .legacy_packages
            .iter()
            .fold(PackageMatcher::default(), |m, p| m.or_package(p.trim()));
        for package in legacy.packages() {
            if !is_qualified_name(package) {
                return Err(invalid(format!("'{package}' is not a package name")));
            }
            if package == target {
                return Err(invalid(format!("'{package}' is both legacy and target")));
            }
        }
        for rename in &options.type_renames {
            if !is_qualified_name(&rename.from) || !is_qualified_name(&rename.to) {
                return Err(invalid(format!("bad type rename {} -> {}", rename.from, rename.to)));
            }
        }
        for rename in &options.method_renames {
            if relocate_name(&rename.declaring_type, target, target).is_none() {
                return Err(invalid(format!("{} is not in target package {target}", rename.declaring_type)));
            }
            if rename.from.is_empty() || rename.to.is_empty() {
                return Err(invalid(format!("blank method rename on {}", rename.declaring_type)));
            }
        }
        Ok(Self::compile(
            &format!("{NAME}[{target}]"),
            &format!("Migrate API to `{target}`"),
            target,
            legacy,
            options,
        ))
    }

    fn compile(name: &str, display_name: &str, target: &str, legacy: PackageMatcher, options: &MigrateApiOptions) -> Self {
        let mut api = Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            target: target.to_string(),
            legacy,
            type_renames: Vec::new(),
            method_renames: Vec::new(),
            sort_imports: options.sort_imports,
        };
        api.type_renames = options
            .type_renames
            .iter()
            .map(|r| TypeRename {
                from: api.relocate(&r.from),
                to: r.to.clone(),
            })
            .collect();
        api.method_renames = options
            .method_renames
            .iter()
            .map(|r| {
                let matcher = api.legacy.packages().iter().fold(
                    MethodMatcher::new(&r.declaring_type, &r.from),
                    |matcher, package| match relocate_name(&r.declaring_type, &api.target, package) {
                        Some(legacy_type) => matcher.or_type(legacy_type),
                        None => matcher,
                    },
                );
                CompiledMethodRename {
                    matcher,
                    to: r.to.clone(),
                }
            })
            .collect();
        api
    }

    /// HtmlUnit 2.x to 3.x: `com.gargoylesoftware.htmlunit` moved to
    /// `org.htmlunit`, `HtmlInput` value accessors renamed
    #[must_use]
    pub fn htmlunit_3() -> Self {
        let html_input = "org.htmlunit.html.HtmlInput".to_string();
        let options = MigrateApiOptions {
            target_package: "org.htmlunit".into(),
            legacy_packages: vec!["com.gargoylesoftware.htmlunit".into()],
            type_renames: Vec::new(),
            method_renames: vec![
                MethodRename {
                    declaring_type: html_input.clone(),
                    from: "getValueAttribute".into(),
                    to: "getValue".into(),
                },
                MethodRename {
                    declaring_type: html_input,
                    from: "setValueAttribute".into(),
                    to: "setValue".into(),
                },
            ],
            sort_imports: true,
        };
        Self::compile(
            "UpgradeHtmlUnit3",
            "Migrate to HtmlUnit 3.x",
            "org.htmlunit",
            PackageMatcher::new("com.gargoylesoftware.htmlunit"),
            &options,
        )
    }

    /// JSR-305 `javax.annotation` to SpotBugs annotations
    #[must_use]
    pub fn javax_annotations_to_spotbugs() -> Self {
        let options = MigrateApiOptions {
            target_package: "edu.umd.cs.findbugs.annotations".into(),
            legacy_packages: vec!["javax.annotation".into()],
            type_renames: vec![TypeRename {
                from: "javax.annotation.Nonnull".into(),
                to: "edu.umd.cs.findbugs.annotations.NonNull".into(),
            }],
            method_renames: Vec::new(),
            sort_imports: false,
        };
        Self::compile(
            "JavaxAnnotationsToSpotbugs",
            "Migrate JSR-305 annotations to SpotBugs annotations",
            "edu.umd.cs.findbugs.annotations",
            PackageMatcher::new("javax.annotation"),
            &options,
        )
    }

    /// `hudson.Util.getPastTimeString` to `getTimeSpanString`
    #[must_use]
    pub fn hudson_util_time_span() -> Self {
        let options = MigrateApiOptions {
            target_package: "hudson".into(),
            legacy_packages: Vec::new(),
            type_renames: Vec::new(),
            method_renames: vec![MethodRename {
                declaring_type: "hudson.Util".into(),
                from: "getPastTimeString".into(),
                to: "getTimeSpanString".into(),
            }],
            sort_imports: false,
        };
        Self::compile(
            "UtilGetPastTimeStringToGetTimeSpanString",
            "Replace `Util.getPastTimeString` with `Util.getTimeSpanString`",
            "hudson",
            PackageMatcher::default(),
            &options,
        )
    }

    /// Target package
    #[inline]
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Name moved out of any legacy root into the target package
    fn relocate(&self, name: &str) -> String {
        self.legacy
            .root_of(name)
            .and_then(|root| relocate_name(name, root, &self.target))
            .unwrap_or_else(|| name.to_string())
    }

    /// Final name for `name`, `None` when it does not move
    #[must_use]
    pub fn migrate_name(&self, name: &str) -> Option<String> {
        let relocated = self.relocate(name);
        let renamed = self
            .type_renames
            .iter()
            .find_map(|r| relocate_name(&relocated, &r.from, &r.to))
            .unwrap_or(relocated);
        (renamed != name).then_some(renamed)
    }

    /// New name of `method` when called on `receiver_type`
    fn method_rename_for(&self, receiver_type: &str, method: &str) -> Option<&str> {
        self.method_renames
            .iter()
            .find(|r| r.matcher.matches_call(receiver_type, method))
            .map(|r| r.to.as_str())
    }

    fn migrate_import(&self, import: &Import) -> Option<Import> {
        let member = (import.is_static && !import.wildcard)
            .then(|| import.path.rsplit_once('.'))
            .flatten()
            .and_then(|(owner, member)| {
                let to = self.method_rename_for(owner, member)?;
                let owner = self.migrate_name(owner).unwrap_or_else(|| owner.to_string());
                Some(format!("{owner}.{to}"))
            });
        member.or_else(|| self.migrate_name(&import.path)).map(|path| Import {
            path,
            ..import.clone()
        })
    }

    fn migrate_type_ref(&self, type_ref: &TypeRef) -> Option<TypeRef> {
        let resolved = type_ref.resolved.as_deref().and_then(|r| self.migrate_name(r));
        let text = if type_ref.text.contains('.') {
            self.migrate_name(&type_ref.text)
        } else {
            match (type_ref.resolved.as_deref(), resolved.as_deref()) {
                (Some(old), Some(new)) if simple_name(old) == type_ref.text => Some(simple_name(new).to_string()),
                _ => None,
            }
        };
        if resolved.is_none() && text.is_none() {
            return None;
        }
        Some(TypeRef {
            text: text.unwrap_or_else(|| type_ref.text.clone()),
            resolved: resolved.or_else(|| type_ref.resolved.clone()),
        })
    }

    fn migrate_method(&self, call: &MethodName) -> Option<MethodName> {
        let receiver = call.receiver_type.as_deref();
        let name = receiver.and_then(|t| self.method_rename_for(t, &call.name));
        let receiver_type = receiver.and_then(|t| self.migrate_name(t));
        if name.is_none() && receiver_type.is_none() {
            return None;
        }
        Some(MethodName {
            name: name.map_or_else(|| call.name.clone(), str::to_string),
            receiver_type: receiver_type.or_else(|| call.receiver_type.clone()),
            receiver_text: call.receiver_text.clone(),
        })
    }

    /// `package.simple` for the on-demand package under which `renamed`
    /// holds; `None` when packages disagree on where the name ends up
    fn attribute(&self, on_demand: &[&str], simple: &str, renamed: impl Fn(&str) -> bool) -> Option<String> {
        let mut found: Option<(String, String)> = None;
        for package in on_demand {
            let name = format!("{package}.{simple}");
            if !renamed(&name) {
                continue;
            }
            let settled = self.migrate_name(&name).unwrap_or_else(|| name.clone());
            match &found {
                None => found = Some((name, settled)),
                Some((_, known)) if *known == settled => {}
                Some(_) => return None,
            }
        }
        found.map(|(name, _)| name)
    }

    /// Segment with names from on-demand imports qualified, where that
    /// leads to a rename
    fn attributed(&self, segment: &JavaSegment, on_demand: &[&str]) -> Option<JavaSegment> {
        match segment {
            JavaSegment::TypeRef(type_ref) if type_ref.resolved.is_none() && !type_ref.text.contains('.') => {
                let simple = type_ref.text.as_str();
                let resolved = self.attribute(on_demand, simple, |name| {
                    self.migrate_name(name).is_some_and(|new| simple_name(&new) != simple)
                })?;
                Some(JavaSegment::TypeRef(TypeRef {
                    text: type_ref.text.clone(),
                    resolved: Some(resolved),
                }))
            }
            JavaSegment::MethodName(call) if call.receiver_type.is_none() => {
                let written = call.receiver_text.as_deref()?;
                let receiver = self.attribute(on_demand, written, |name| {
                    self.method_rename_for(name, &call.name).is_some()
                })?;
                Some(JavaSegment::MethodName(MethodName {
                    receiver_type: Some(receiver),
                    receiver_text: None,
                    ..call.clone()
                }))
            }
            _ => None,
        }
    }

    fn migrate_segment(&self, segment: &JavaSegment, on_demand: &[&str]) -> Option<JavaSegment> {
        if let Some(attributed) = self.attributed(segment, on_demand) {
            return self.migrate_segment(&attributed, &[]).or(Some(attributed));
        }
        match segment {
            JavaSegment::Source(_) => None,
            JavaSegment::Import(import) => self.migrate_import(import).map(JavaSegment::Import),
            JavaSegment::TypeRef(type_ref) => self.migrate_type_ref(type_ref).map(JavaSegment::TypeRef),
            JavaSegment::MethodName(call) => self.migrate_method(call).map(JavaSegment::MethodName),
        }
    }

    /// Import block with `rewritten` imports first
    ///
    /// `None` when the block holds anything besides imports and whitespace.
    fn regrouped(doc: &JavaDocument, rewritten: &BTreeSet<Import>) -> Option<(usize, Vec<JavaSegment>)> {
        let (first, last) = doc.import_region()?;
        let mut others = Vec::new();
        let mut separator: Option<String> = None;
        for index in first..=last {
            match doc.segment(index)? {
                JavaSegment::Import(import) if rewritten.contains(import) => separator = None,
                JavaSegment::Import(import) => {
                    if let Some(text) = separator.take() {
                        others.push(JavaSegment::Source(text));
                    }
                    others.push(JavaSegment::Import(import.clone()));
                }
                JavaSegment::Source(text) if text.trim().is_empty() => separator = Some(text.clone()),
                _ => return None,
            }
        }
        if others.first().is_some_and(|s| matches!(s, JavaSegment::Source(_))) {
            others.remove(0);
        }

        let mut region = Vec::new();
        for (i, import) in rewritten.iter().enumerate() {
            if i > 0 {
                region.push(JavaSegment::Source("\n".to_string()));
            }
            region.push(JavaSegment::Import(import.clone()));
        }
        if !others.is_empty() {
            region.push(JavaSegment::Source("\n\n".to_string()));
            region.extend(others);
        }
        Some((first, region))
    }

    fn regroup_imports(session: &mut EditSession<JavaDocument>, rewritten: &BTreeSet<Import>) -> Result<(), RecipeError> {
        let doc = session.document();
        let Some((first, region)) = Self::regrouped(doc, rewritten) else {
            tracing::debug!("import block has comments, keeping order");
            return Ok(());
        };
        let Some((_, last)) = doc.import_region() else {
            return Ok(());
        };
        let before: String = (first..=last).filter_map(|i| doc.segment(i)).map(ToString::to_string).collect();
        let after: String = region.iter().map(ToString::to_string).collect();
        if before == after {
            return Ok(());
        }
        for index in (first..=last).rev() {
            session.remove(&NodePath::new([index]))?;
        }
        for (offset, segment) in region.into_iter().enumerate() {
            session.insert_child(&NodePath::root(), segment, &InsertPosition::At(first + offset))?;
        }
        Ok(())
    }
}

impl Recipe for MigrateApi {
    fn name(&self) -> &str {
        &self.name
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn description(&self) -> &str {
        "Moves references from legacy packages to the target package and applies type and method renames."
    }

    fn precedence(&self) -> Precedence {
        Precedence::Structural
    }

    fn apply(&self, source: &SourceFile) -> Result<RecipeResult, RecipeError> {
        let Some(doc) = source.document().as_java() else {
            return Ok(RecipeResult::Unchanged);
        };
        let mut session = EditSession::new(doc.clone());
        let mut rewritten = BTreeSet::new();
        let on_demand: Vec<&str> = doc.on_demand_packages().collect();
        for (index, segment) in doc.segments().iter().enumerate() {
            let Some(migrated) = self.migrate_segment(segment, &on_demand) else {
                continue;
            };
            if let JavaSegment::Import(import) = &migrated {
                rewritten.insert(import.clone());
            }
            session.replace(&NodePath::new([index]), migrated)?;
        }
        if self.sort_imports && !rewritten.is_empty() {
            Self::regroup_imports(&mut session, &rewritten)?;
        }
        tracing::debug!(recipe = %self.name, path = %source.path().display(), edits = session.records().len(), "migrated");
        Ok(RecipeResult::from_session(session))
    }
}
