//! Java compilation unit as a flat segment list
//!
//! Only the parts of a Java file that migrations touch are modelled:
//! imports, type references and method invocation names. Everything else is
//! kept as verbatim [`JavaSegment::Source`] text, so printing the segments
//! in order reproduces the file exactly. Type references and invocation
//! receivers carry the fully-qualified names the front end resolved them
//! to, which lets matchers tell `HtmlInput.getValueAttribute()` apart from
//! an unrelated type with a method of the same name.

use im::Vector;
use std::fmt::{self, Display, Formatter};

/// A Java source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaDocument {
    package: Option<String>,
    segments: Vector<JavaSegment>,
}

/// One piece of a Java source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JavaSegment {
    /// Verbatim text between interesting nodes
    Source(String),
    /// An import declaration
    Import(Import),
    /// A type name in code (declarations, generics, annotations, casts)
    TypeRef(TypeRef),
    /// The name part of a method invocation
    MethodName(MethodName),
}

/// `import [static] path[.*];`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Import {
    /// Imported name without `.*`
    pub path: String,
    /// `import static`
    pub is_static: bool,
    /// On-demand import (`.*`)
    pub wildcard: bool,
}

/// Type name occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    /// Text as written, simple or qualified
    pub text: String,
    /// Fully-qualified name, when resolvable
    pub resolved: Option<String>,
}

/// Invoked method name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodName {
    /// Identifier as written
    pub name: String,
    /// Fully-qualified type of the receiver expression, when resolvable
    pub receiver_type: Option<String>,
    /// Receiver's declared type as written, when it could not be qualified
    /// (a name brought in by an on-demand import)
    pub receiver_text: Option<String>,
}

/// Move `name` from package `from` to package `to`
///
/// Matches whole package segments: `javax.annotation` moves
/// `javax.annotation.CheckForNull` but not `javax.annotations.Foo`.
#[must_use]
pub fn relocate_name(name: &str, from: &str, to: &str) -> Option<String> {
    if name == from {
        return Some(to.to_string());
    }
    name.strip_prefix(from)
        .and_then(|rest| rest.strip_prefix('.'))
        .map(|rest| format!("{to}.{rest}"))
}

impl Import {
    /// Single-type import
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_static: false,
            wildcard: false,
        }
    }

    /// Simple name bound by a single-type import
    #[must_use]
    pub fn simple_name(&self) -> Option<&str> {
        if self.wildcard {
            return None;
        }
        self.path.rsplit('.').next()
    }

    /// Copy moved from one package to another, if it lives there
    #[must_use]
    pub fn relocated(&self, from: &str, to: &str) -> Option<Self> {
        relocate_name(&self.path, from, to).map(|path| Self { path, ..self.clone() })
    }
}

impl Display for Import {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("import ")?;
        if self.is_static {
            f.write_str("static ")?;
        }
        f.write_str(&self.path)?;
        if self.wildcard {
            f.write_str(".*")?;
        }
        f.write_str(";")
    }
}

impl TypeRef {
    /// Copy moved from one package to another
    ///
    /// A qualified spelling is rewritten too; a simple spelling only has its
    /// resolution updated.
    #[must_use]
    pub fn relocated(&self, from: &str, to: &str) -> Option<Self> {
        let resolved = self.resolved.as_deref().and_then(|r| relocate_name(r, from, to));
        let text = relocate_name(&self.text, from, to);
        if resolved.is_none() && text.is_none() {
            return None;
        }
        Some(Self {
            text: text.unwrap_or_else(|| self.text.clone()),
            resolved: resolved.or_else(|| self.resolved.clone()),
        })
    }
}

impl Display for JavaSegment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source(text) => f.write_str(text),
            Self::Import(import) => write!(f, "{import}"),
            Self::TypeRef(type_ref) => f.write_str(&type_ref.text),
            Self::MethodName(method) => f.write_str(&method.name),
        }
    }
}

impl JavaDocument {
    /// Build a document from its segments
    #[must_use]
    pub fn new(package: Option<String>, segments: Vector<JavaSegment>) -> Self {
        Self { package, segments }
    }

    /// Declared package
    #[inline]
    #[must_use]
    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    /// All segments in source order
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &Vector<JavaSegment> {
        &self.segments
    }

    /// Segment by index
    #[inline]
    #[must_use]
    pub fn segment(&self, index: usize) -> Option<&JavaSegment> {
        self.segments.get(index)
    }

    /// Import declarations with their segment index
    pub fn imports(&self) -> impl Iterator<Item = (usize, &Import)> {
        self.segments.iter().enumerate().filter_map(|(i, s)| match s {
            JavaSegment::Import(import) => Some((i, import)),
            _ => None,
        })
    }

    /// Packages of non-static on-demand imports (`import a.b.*;`)
    pub fn on_demand_packages(&self) -> impl Iterator<Item = &str> {
        self.imports()
            .filter(|(_, import)| import.wildcard && !import.is_static)
            .map(|(_, import)| import.path.as_str())
    }

    /// Segment index range `first..=last` spanning all imports
    #[must_use]
    pub fn import_region(&self) -> Option<(usize, usize)> {
        let mut imports = self.imports().map(|(i, _)| i);
        let first = imports.next()?;
        Some((first, imports.last().unwrap_or(first)))
    }

    /// Copy with a different segment list
    #[must_use]
    pub fn with_segments(&self, segments: Vector<JavaSegment>) -> Self {
        Self {
            package: self.package.clone(),
            segments,
        }
    }

    pub(crate) fn segments_mut(&mut self) -> &mut Vector<JavaSegment> {
        &mut self.segments
    }
}

impl Display for JavaDocument {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relocate_matches_whole_segments() {
        assert_eq!(
            relocate_name("javax.annotation.CheckForNull", "javax.annotation", "edu.umd.cs.findbugs.annotations")
                .as_deref(),
            Some("edu.umd.cs.findbugs.annotations.CheckForNull")
        );
        assert_eq!(relocate_name("javax.annotations.Foo", "javax.annotation", "x"), None);
        assert_eq!(relocate_name("javax.annotation", "javax.annotation", "x").as_deref(), Some("x"));
    }

    #[test]
    fn import_prints_canonically() {
        let mut import = Import::new("org.junit.Assert");
        import.is_static = true;
        import.wildcard = true;
        assert_eq!(import.to_string(), "import static org.junit.Assert.*;");
        assert_eq!(Import::new("a.b.C").simple_name(), Some("C"));
    }

    #[test]
    fn simple_type_ref_keeps_spelling() {
        let type_ref = TypeRef {
            text: "HtmlInput".into(),
            resolved: Some("com.gargoylesoftware.htmlunit.html.HtmlInput".into()),
        };
        let moved = type_ref.relocated("com.gargoylesoftware.htmlunit", "org.htmlunit").unwrap();
        assert_eq!(moved.text, "HtmlInput");
        assert_eq!(moved.resolved.as_deref(), Some("org.htmlunit.html.HtmlInput"));
        assert!(moved.relocated("com.gargoylesoftware.htmlunit", "org.htmlunit").is_none());
    }

    #[test]
    fn prints_segments_in_order() {
        let doc = JavaDocument::new(
            None,
            Vector::from(vec![
                JavaSegment::Import(Import::new("a.B")),
                JavaSegment::Source("\nclass C { void f(B b) { b.".into()),
                JavaSegment::MethodName(MethodName {
                    name: "run".into(),
                    receiver_type: Some("a.B".into()),
                    receiver_text: None,
                }),
                JavaSegment::Source("(); } }\n".into()),
            ]),
        );
        assert_eq!(doc.to_string(), "import a.B;\nclass C { void f(B b) { b.run(); } }\n");
        assert_eq!(doc.import_region(), Some((0, 0)));
    }

    #[test]
    fn on_demand_packages_skip_static_and_single_imports() {
        let mut wildcard = Import::new("org.htmlunit.html");
        wildcard.wildcard = true;
        let mut static_wildcard = Import::new("org.junit.Assert");
        static_wildcard.is_static = true;
        static_wildcard.wildcard = true;
        let doc = JavaDocument::new(
            None,
            Vector::from(vec![
                JavaSegment::Import(wildcard),
                JavaSegment::Import(static_wildcard),
                JavaSegment::Import(Import::new("java.util.List")),
            ]),
        );
        assert_eq!(doc.on_demand_packages().collect::<Vec<_>>(), vec!["org.htmlunit.html"]);
    }
}
