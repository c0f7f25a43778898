//! JPM Composition System
//!
//! Runs many independent recipes over a project without the recipes
//! knowing about each other.
//!
//! # Core Concepts
//!
//! - [`Recipe`]: Named transformation returning [`RecipeResult`]
//! - [`Composer`]: Left fold of recipes per document, documents in parallel
//! - [`CompositionStrategy`]: Recipe scheduling and conflict policy
//! - [`SingleWriterStrategy`]: Contested values are rejected and reported (default)
//! - [`OrderedCompositionStrategy`]: Declaration order, last writer wins
//! - [`ClaimLedger`]: Which recipe wrote which value
//! - [`StrategyRegistry`]: Registry for strategy selection
//!
//! # Example
//!
//! ```rust,ignore
//! use jpm_composition::{Composer, ComposerConfig, StrategyHint};
//!
//! let composer = Composer::with_config(recipes, ComposerConfig::default().with_hint(StrategyHint::Safety))?;
//! let report = composer.run(&sources);
//! for diagnostic in &report.diagnostics {
//!     eprintln!("{diagnostic}");
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod composer;
mod diagnostic;
mod ledger;
mod ordered;
mod recipe;
mod registry;
mod single_writer;
mod strategy;

#[cfg(test)]
mod test_support;

// Re-exports
pub use composer::{Composer, ComposerConfig, CompositionReport, DocumentOutcome};
pub use diagnostic::{Diagnostic, DiagnosticKind, Severity};
pub use ledger::{Claim, ClaimLedger, Conflict};
pub use ordered::OrderedCompositionStrategy;
pub use recipe::{Precedence, Recipe, RecipeError, RecipeResult};
pub use registry::{StrategyHint, StrategyRegistry};
pub use single_writer::SingleWriterStrategy;
pub use strategy::{CompositionError, CompositionStrategy, Resolution};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
