//! Testing utilities for the JPM workspace
//!
//! Shared fixtures and before/after assertions for recipe tests.
//! Everything here panics on failure; it is only meant for tests.

#![allow(clippy::missing_panics_doc)]

use jpm_composition::Recipe;
use jpm_tree::SourceFile;
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};

/// Strip the common indentation of an indented raw string literal
///
/// A blank first line is dropped, whitespace-only lines become empty and
/// do not count towards the common indent.
#[must_use]
pub fn dedent(text: &str) -> String {
    let text = match text.split_once('\n') {
        Some((first, rest)) if first.trim().is_empty() => rest,
        _ => text,
    };
    let indent = text
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);
    text.split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                if line.ends_with('\r') { "\r" } else { "" }
            } else {
                &line[indent..]
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `pom.xml` parsed from indented text
#[must_use]
pub fn parse_pom(text: &str) -> SourceFile {
    let content = dedent(text);
    let doc = jpm_io::parse_xml(Path::new("pom.xml"), &content)
        .unwrap_or_else(|e| panic!("fixture POM does not parse: {e}"));
    SourceFile::new("pom.xml", doc)
}

/// Java source parsed from indented text
#[must_use]
pub fn parse_java(path: impl Into<PathBuf>, text: &str) -> SourceFile {
    let path = path.into();
    let content = dedent(text);
    let doc = jpm_io::parse_java(&path, &content).unwrap_or_else(|e| panic!("fixture Java does not parse: {e}"));
    SourceFile::new(path, doc)
}

/// Any file, parsed by the default parser for its extension
#[must_use]
pub fn parse_source(path: impl Into<PathBuf>, text: &str) -> SourceFile {
    let path = path.into();
    let content = dedent(text);
    let doc = jpm_io::default_parsers()
        .parse(&path, &content)
        .unwrap_or_else(|e| panic!("fixture {} does not parse: {e}", path.display()));
    SourceFile::new(path, doc)
}

/// Apply `recipe`, compare the printed result with `after`, then check a
/// second application changes nothing
pub fn assert_rewrite(recipe: &dyn Recipe, before: &SourceFile, after: &str) {
    let result = recipe
        .apply(before)
        .unwrap_or_else(|e| panic!("{} failed: {e}", recipe.name()));
    let Some(document) = result.document() else {
        panic!("{} left {} unchanged", recipe.name(), before.path().display());
    };
    assert_eq!(document.print(), dedent(after));

    let edited = before.with_document(document.clone());
    let again = recipe
        .apply(&edited)
        .unwrap_or_else(|e| panic!("{} failed on its own output: {e}", recipe.name()));
    assert!(!again.is_changed(), "{} is not idempotent", recipe.name());
}

/// Apply `recipe` and check it reports no change
pub fn assert_unchanged(recipe: &dyn Recipe, source: &SourceFile) {
    let result = recipe
        .apply(source)
        .unwrap_or_else(|e| panic!("{} failed: {e}", recipe.name()));
    if let Some(document) = result.document() {
        assert_eq!(document.print(), source.document().print(), "{} changed the file", recipe.name());
        panic!("{} reported a change without changing the text", recipe.name());
    }
}

/// Install a test-writer subscriber honouring `RUST_LOG`
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
