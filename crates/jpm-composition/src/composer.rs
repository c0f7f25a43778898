//! Recipe Composer
//!
//! Per document the composer is a left fold: each scheduled recipe receives
//! the latest document and returns a new one or nothing. Documents are
//! independent values, so a project is processed one document per rayon
//! task. Generated files are produced after every edit has landed.

use crate::diagnostic::{Diagnostic, DiagnosticKind, Severity};
use crate::ledger::ClaimLedger;
use crate::recipe::{Recipe, RecipeError, RecipeResult};
use crate::registry::{StrategyHint, StrategyRegistry};
use crate::strategy::{CompositionError, CompositionStrategy, Resolution};
use jpm_tree::SourceFile;
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Composer settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerConfig {
    /// Registry name of the composition strategy
    pub strategy: String,
    /// Process documents on the rayon pool
    pub parallel: bool,
    /// Report rejected conflicting edits as errors rather than warnings
    pub conflicts_as_errors: bool,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyHint::default().strategy_name().to_string(),
            parallel: true,
            conflicts_as_errors: true,
        }
    }
}

impl ComposerConfig {
    /// Use the strategy registered as `name`
    #[must_use]
    pub fn with_strategy(mut self, name: impl Into<String>) -> Self {
        self.strategy = name.into();
        self
    }

    /// Use the strategy for `hint`
    #[must_use]
    pub fn with_hint(self, hint: StrategyHint) -> Self {
        self.with_strategy(hint.strategy_name())
    }

    /// Toggle parallel document processing
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Choose the severity of rejected conflicts
    #[must_use]
    pub fn with_conflicts_as_errors(mut self, as_errors: bool) -> Self {
        self.conflicts_as_errors = as_errors;
        self
    }
}

/// Result of composing all recipes over one document
#[derive(Debug, Clone)]
pub struct DocumentOutcome {
    /// Final state of the document
    pub source: SourceFile,
    /// Whether the final content differs from the input
    pub changed: bool,
    /// Recipes whose edits were kept, in application order
    pub applied: Vec<String>,
    /// Findings for this document
    pub diagnostics: Vec<Diagnostic>,
}

/// Result of a composer run over a project
#[derive(Debug, Clone, Default)]
pub struct CompositionReport {
    /// Every input source in its final state, in input order
    pub sources: Vec<SourceFile>,
    /// Paths whose content changed
    pub changed: Vec<PathBuf>,
    /// New files produced by generators
    pub generated: Vec<SourceFile>,
    /// Findings across all documents
    pub diagnostics: Vec<Diagnostic>,
}

impl CompositionReport {
    /// Whether any diagnostic is an error
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    /// Final state of the source at `path`
    #[must_use]
    pub fn source(&self, path: &Path) -> Option<&SourceFile> {
        self.sources
            .iter()
            .chain(&self.generated)
            .find(|s| s.path() == path)
    }

    /// Changed and generated files, the set a writer has to persist
    pub fn to_write(&self) -> impl Iterator<Item = &SourceFile> {
        let changed: HashSet<&Path> = self.changed.iter().map(PathBuf::as_path).collect();
        self.sources
            .iter()
            .filter(move |s| changed.contains(s.path()))
            .chain(&self.generated)
    }
}

/// Runs a fixed list of recipes over documents
#[derive(Debug, Clone)]
pub struct Composer {
    recipes: Vec<Arc<dyn Recipe>>,
    strategy: Arc<dyn CompositionStrategy>,
    config: ComposerConfig,
}

impl Composer {
    /// Composer with the default configuration
    ///
    /// # Errors
    /// Returns [`CompositionError::DuplicateRecipe`] when two recipes share a name.
    pub fn new(recipes: Vec<Arc<dyn Recipe>>) -> Result<Self, CompositionError> {
        Self::with_config(recipes, ComposerConfig::default())
    }

    /// Composer using the built-in strategies
    ///
    /// # Errors
    /// Fails for an unknown strategy name or duplicate recipe names.
    pub fn with_config(recipes: Vec<Arc<dyn Recipe>>, config: ComposerConfig) -> Result<Self, CompositionError> {
        Self::with_registry(recipes, config, &StrategyRegistry::with_defaults())
    }

    /// Composer resolving the strategy from `registry`
    ///
    /// # Errors
    /// Fails for an unknown strategy name or duplicate recipe names.
    pub fn with_registry(
        recipes: Vec<Arc<dyn Recipe>>,
        config: ComposerConfig,
        registry: &StrategyRegistry,
    ) -> Result<Self, CompositionError> {
        let strategy = registry.get(&config.strategy)?;
        let mut names = HashSet::new();
        for recipe in &recipes {
            if !names.insert(recipe.name().to_string()) {
                return Err(CompositionError::DuplicateRecipe(recipe.name().to_string()));
            }
        }
        Ok(Self {
            recipes,
            strategy,
            config,
        })
    }

    /// Recipes in declaration order
    #[inline]
    #[must_use]
    pub fn recipes(&self) -> &[Arc<dyn Recipe>] {
        &self.recipes
    }

    /// Active strategy
    #[inline]
    #[must_use]
    pub fn strategy(&self) -> &dyn CompositionStrategy {
        self.strategy.as_ref()
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Fold every scheduled recipe over one document
    #[must_use]
    pub fn compose_document(&self, source: &SourceFile) -> DocumentOutcome {
        let path = source.path().to_path_buf();
        let original = source.document().content_hash();
        let mut current = source.clone();
        let mut ledger = ClaimLedger::new();
        let mut applied = Vec::new();
        let mut diagnostics = Vec::new();

        for index in self.strategy.schedule(&self.recipes) {
            let recipe = &self.recipes[index];
            let name = recipe.name();
            match recipe.apply(&current) {
                Ok(RecipeResult::Unchanged) => {
                    tracing::debug!(recipe = name, document = %path.display(), "unchanged");
                }
                Ok(RecipeResult::Changed { document, edits }) => {
                    if document.content_hash() == current.document().content_hash() {
                        tracing::debug!(recipe = name, document = %path.display(), "identical output, unchanged");
                        continue;
                    }
                    match self.strategy.resolve(ledger.conflicts(name, &edits)) {
                        Resolution::Accept => {}
                        Resolution::Overwrite(conflicts) => {
                            for conflict in &conflicts {
                                tracing::debug!(recipe = name, document = %path.display(), %conflict, "overwriting");
                                diagnostics.push(Diagnostic::conflict(
                                    &path,
                                    conflict,
                                    DiagnosticKind::Overwritten,
                                    Severity::Info,
                                ));
                            }
                        }
                        Resolution::Reject(conflicts) => {
                            let severity = if self.config.conflicts_as_errors {
                                Severity::Error
                            } else {
                                Severity::Warning
                            };
                            for conflict in &conflicts {
                                tracing::warn!(recipe = name, document = %path.display(), %conflict, "conflicting edit rejected");
                                diagnostics.push(Diagnostic::conflict(&path, conflict, DiagnosticKind::Conflict, severity));
                            }
                            continue;
                        }
                    }
                    tracing::debug!(recipe = name, document = %path.display(), edits = edits.len(), "applied");
                    ledger.record(name, &edits);
                    current = current.with_document(document);
                    applied.push(name.to_string());
                }
                Err(error) => {
                    let (kind, severity) = classify(&error);
                    tracing::warn!(recipe = name, document = %path.display(), %error, "recipe skipped");
                    diagnostics.push(Diagnostic::new(name, &path, kind, severity, error.to_string()));
                }
            }
        }

        DocumentOutcome {
            changed: current.document().content_hash() != original,
            source: current,
            applied,
            diagnostics,
        }
    }

    /// Compose every document, then run generators over the result
    #[must_use]
    pub fn run(&self, sources: &[SourceFile]) -> CompositionReport {
        let outcomes: Vec<DocumentOutcome> = if self.config.parallel {
            sources.par_iter().map(|s| self.compose_document(s)).collect()
        } else {
            sources.iter().map(|s| self.compose_document(s)).collect()
        };

        let mut report = CompositionReport::default();
        for outcome in outcomes {
            if outcome.changed {
                report.changed.push(outcome.source.path().to_path_buf());
            }
            report.diagnostics.extend(outcome.diagnostics);
            report.sources.push(outcome.source);
        }
        self.generate(&mut report);

        tracing::info!(
            strategy = self.strategy.name(),
            documents = report.sources.len(),
            changed = report.changed.len(),
            generated = report.generated.len(),
            diagnostics = report.diagnostics.len(),
            "composition finished"
        );
        report
    }

    fn generate(&self, report: &mut CompositionReport) {
        let mut taken: HashSet<PathBuf> = report.sources.iter().map(|s| s.path().to_path_buf()).collect();
        for index in self.strategy.schedule(&self.recipes) {
            let recipe = &self.recipes[index];
            let generated = match recipe.generate(&report.sources) {
                Ok(generated) => generated,
                Err(error) => {
                    let (kind, severity) = classify(&error);
                    tracing::warn!(recipe = recipe.name(), %error, "generation failed");
                    report
                        .diagnostics
                        .push(Diagnostic::new(recipe.name(), Path::new(""), kind, severity, error.to_string()));
                    continue;
                }
            };
            for file in generated {
                if taken.insert(file.path().to_path_buf()) {
                    tracing::debug!(recipe = recipe.name(), document = %file.path().display(), "generated");
                    report.generated.push(file);
                } else {
                    report.diagnostics.push(Diagnostic::new(
                        recipe.name(),
                        file.path(),
                        DiagnosticKind::GenerationSkipped,
                        Severity::Info,
                        "file already exists",
                    ));
                }
            }
        }
    }
}

fn classify(error: &RecipeError) -> (DiagnosticKind, Severity) {
    match error {
        RecipeError::MalformedVersion(_) => (DiagnosticKind::NotApplicable, Severity::Warning),
        RecipeError::Ambiguous(_) => (DiagnosticKind::Ambiguous, Severity::Error),
        _ => (DiagnosticKind::Failed, Severity::Error),
    }
}
