//! Type-aware matching over Java documents
//!
//! Matchers work on resolved names, never on spelling alone. A
//! [`MethodMatcher`] carries several candidate declaring types so one
//! matcher can recognise a call whether the receiver type still lives in a
//! library's old package or has already been moved to the new one.

use crate::java::{relocate_name, JavaDocument, JavaSegment};
use crate::matcher::{Match, Matchable, MatchError};
use crate::path::NodePath;
use std::fmt::{self, Display, Formatter};

/// Matches names inside any of a set of packages
///
/// The default matcher has no packages and matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PackageMatcher {
    packages: Vec<String>,
}

impl PackageMatcher {
    /// Match names in `package` or its subpackages
    #[must_use]
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            packages: vec![package.into()],
        }
    }

    /// Also accept another root package
    #[must_use]
    pub fn or_package(mut self, package: impl Into<String>) -> Self {
        self.packages.push(package.into());
        self
    }

    /// Candidate root packages
    #[must_use]
    pub fn packages(&self) -> &[String] {
        &self.packages
    }

    /// The candidate root `name` lives under, if any
    #[must_use]
    pub fn root_of(&self, name: &str) -> Option<&str> {
        self.packages
            .iter()
            .find(|p| relocate_name(name, p, p).is_some())
            .map(String::as_str)
    }
}

impl Display for PackageMatcher {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.packages.join("|"))
    }
}

/// Matches invocations of one method on any of several declaring types
///
/// Written as `com.example.Type methodName(..)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodMatcher {
    declaring_types: Vec<String>,
    method: String,
}

impl MethodMatcher {
    /// Matcher for `method` on `declaring_type`
    #[must_use]
    pub fn new(declaring_type: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            declaring_types: vec![declaring_type.into()],
            method: method.into(),
        }
    }

    /// Parse `com.example.Type methodName(..)`
    ///
    /// # Errors
    /// Returns [`MatchError::InvalidPattern`] when the type or method is missing.
    pub fn parse(signature: &str) -> Result<Self, MatchError> {
        let invalid = |reason: &str| MatchError::InvalidPattern {
            pattern: signature.to_string(),
            reason: reason.to_string(),
        };
        let (declaring_type, rest) = signature
            .trim()
            .split_once(char::is_whitespace)
            .ok_or_else(|| invalid("expected '<type> <method>(..)'"))?;
        let method = rest.trim().split('(').next().unwrap_or_default().trim();
        if method.is_empty() || !method.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$') {
            return Err(invalid("missing method name"));
        }
        Ok(Self::new(declaring_type, method))
    }

    /// Also accept the same method on another declaring type
    #[must_use]
    pub fn or_type(mut self, declaring_type: impl Into<String>) -> Self {
        let declaring_type = declaring_type.into();
        if !self.declaring_types.contains(&declaring_type) {
            self.declaring_types.push(declaring_type);
        }
        self
    }

    /// Candidate declaring types
    #[must_use]
    pub fn declaring_types(&self) -> &[String] {
        &self.declaring_types
    }

    /// Method name
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Whether `method` invoked on `receiver_type` is this method
    #[must_use]
    pub fn matches_call(&self, receiver_type: &str, method: &str) -> bool {
        method == self.method && self.declaring_types.iter().any(|t| t == receiver_type)
    }

    /// Whether an invocation segment calls this method on a candidate type
    #[must_use]
    pub fn matches(&self, segment: &JavaSegment) -> bool {
        match segment {
            JavaSegment::MethodName(call) => call
                .receiver_type
                .as_deref()
                .is_some_and(|t| self.matches_call(t, &call.name)),
            _ => false,
        }
    }
}

impl Display for MethodMatcher {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}(..)", self.declaring_types.join("|"), self.method)
    }
}

/// What to look for in a Java document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JavaPattern {
    /// Imports of names under the given packages
    Import(PackageMatcher),
    /// Type references resolving into the given packages
    TypeRef(PackageMatcher),
    /// Method invocations
    Method(MethodMatcher),
}

impl JavaPattern {
    /// Evaluate against one segment
    #[must_use]
    pub fn test(&self, segment: &JavaSegment) -> bool {
        match (self, segment) {
            (Self::Import(packages), JavaSegment::Import(import)) => packages.root_of(&import.path).is_some(),
            (Self::TypeRef(packages), JavaSegment::TypeRef(type_ref)) => {
                packages.root_of(type_ref.resolved.as_deref().unwrap_or(&type_ref.text)).is_some()
            }
            (Self::Method(method), segment) => method.matches(segment),
            _ => false,
        }
    }
}

impl Display for JavaPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Import(p) => write!(f, "import {p}"),
            Self::TypeRef(p) => write!(f, "type {p}"),
            Self::Method(m) => write!(f, "{m}"),
        }
    }
}

impl Matchable for JavaDocument {
    type Node = JavaSegment;
    type Pattern = JavaPattern;

    fn find<'a>(&'a self, pattern: &'a JavaPattern) -> impl Iterator<Item = Match<'a, JavaSegment>> + 'a {
        self.segments()
            .iter()
            .enumerate()
            .filter(move |(_, segment)| pattern.test(segment))
            .map(|(index, node)| Match {
                path: NodePath::new([index]),
                node,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::java::{Import, MethodName, TypeRef};
    use im::Vector;

    fn call(name: &str, receiver: Option<&str>) -> JavaSegment {
        JavaSegment::MethodName(MethodName {
            name: name.into(),
            receiver_type: receiver.map(Into::into),
            receiver_text: None,
        })
    }

    #[test]
    fn parses_signatures() {
        let m = MethodMatcher::parse("com.gargoylesoftware.htmlunit.html.HtmlInput getValueAttribute(..)").unwrap();
        assert_eq!(m.method(), "getValueAttribute");
        assert_eq!(m.declaring_types(), &["com.gargoylesoftware.htmlunit.html.HtmlInput".to_string()]);
        assert!(MethodMatcher::parse("getValueAttribute()").is_err());
        assert!(MethodMatcher::parse("a.B (..)").is_err());
    }

    #[test]
    fn method_needs_resolved_receiver() {
        let m = MethodMatcher::new("org.htmlunit.html.HtmlInput", "getValueAttribute")
            .or_type("com.gargoylesoftware.htmlunit.html.HtmlInput");
        assert!(m.matches(&call("getValueAttribute", Some("org.htmlunit.html.HtmlInput"))));
        assert!(m.matches(&call("getValueAttribute", Some("com.gargoylesoftware.htmlunit.html.HtmlInput"))));
        assert!(!m.matches(&call("getValueAttribute", Some("com.example.Other"))));
        assert!(!m.matches(&call("getValueAttribute", None)));
        assert!(!m.matches(&call("getValue", Some("org.htmlunit.html.HtmlInput"))));
        assert!(m.matches_call("org.htmlunit.html.HtmlInput", "getValueAttribute"));
        assert!(!m.matches_call("HtmlInput", "getValueAttribute"));
    }

    #[test]
    fn finds_imports_and_types_by_package() {
        let doc = JavaDocument::new(
            None,
            Vector::from(vec![
                JavaSegment::Import(Import::new("javax.annotation.CheckForNull")),
                JavaSegment::Source("\n".into()),
                JavaSegment::Import(Import::new("java.util.List")),
                JavaSegment::Source("\n@".into()),
                JavaSegment::TypeRef(TypeRef {
                    text: "CheckForNull".into(),
                    resolved: Some("javax.annotation.CheckForNull".into()),
                }),
            ]),
        );
        let imports = JavaPattern::Import(PackageMatcher::new("javax.annotation"));
        let found: Vec<_> = doc.find(&imports).map(|m| m.path).collect();
        assert_eq!(found, vec![NodePath::new([0])]);
        let types = JavaPattern::TypeRef(PackageMatcher::new("javax.annotation"));
        assert_eq!(doc.find_one(&types).unwrap().map(|m| m.path), Some(NodePath::new([4])));
    }

    #[test]
    fn package_matcher_picks_candidate_root() {
        let p = PackageMatcher::new("com.gargoylesoftware.htmlunit").or_package("org.htmlunit");
        assert_eq!(p.root_of("org.htmlunit.WebClient"), Some("org.htmlunit"));
        assert_eq!(p.root_of("org.htmlunitx.WebClient"), None);
        assert_eq!(p.to_string(), "com.gargoylesoftware.htmlunit|org.htmlunit");
        assert_eq!(PackageMatcher::default().root_of("org.htmlunit.WebClient"), None);
    }
}
