//! Document parsers for the file formats recipes touch
//!
//! - XML (POMs and other descriptors) via quick-xml
//! - Java compilation units via tree-sitter
//! - Everything else recipes care about (Jelly views, properties) as text

use crate::error::ParseError;
use jpm_tree::{Document, DocumentKind};
use std::path::Path;

mod java;
mod text;
mod xml;

pub use java::{parse_java, JavaParser};
pub use text::TextParser;
pub use xml::{parse_xml, XmlParser};

/// Parser trait for converting file content into documents
///
/// Implement this trait to add support for new file formats.
pub trait DocumentParser: Send + Sync + 'static {
    /// Kind of document this parser produces
    fn kind(&self) -> DocumentKind;

    /// Parse content; `path` is only used for error messages
    ///
    /// # Errors
    /// Returns [`ParseError`] when the content is not well formed.
    fn parse(&self, path: &Path, content: &str) -> Result<Document, ParseError>;

    /// Check if this parser can handle the given path
    fn can_parse(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions().contains(&ext))
    }

    /// Supported file extensions (without dot)
    fn extensions(&self) -> &[&str];

    /// Parser priority (higher = tried first when multiple parsers match)
    fn priority(&self) -> i32 {
        0
    }
}

/// Parsers looked up by file extension
pub struct ParserRegistry {
    parsers: Vec<Box<dyn DocumentParser>>,
}

impl Default for ParserRegistry {
    fn default() -> Self {
        default_parsers()
    }
}

impl std::fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserRegistry")
            .field("parser_count", &self.parsers.len())
            .field("extensions", &self.all_extensions())
            .finish()
    }
}

impl ParserRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { parsers: Vec::new() }
    }

    /// Register a parser
    pub fn register<P: DocumentParser>(&mut self, parser: P) {
        self.parsers.push(Box::new(parser));
        self.parsers.sort_by_key(|p| std::cmp::Reverse(p.priority()));
    }

    /// Find parser for path
    #[must_use]
    pub fn find_for_path(&self, path: &Path) -> Option<&dyn DocumentParser> {
        self.parsers.iter().find(|p| p.can_parse(path)).map(|p| &**p)
    }

    /// Parse with the parser registered for `path`
    ///
    /// # Errors
    /// [`ParseError::NoParserForExtension`] when nothing handles the path,
    /// otherwise whatever the parser reports.
    pub fn parse(&self, path: &Path, content: &str) -> Result<Document, ParseError> {
        let parser = self.find_for_path(path).ok_or_else(|| {
            let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            ParseError::NoParserForExtension(extension.to_string())
        })?;
        parser.parse(path, content)
    }

    /// Get all registered extensions
    #[must_use]
    pub fn all_extensions(&self) -> Vec<&str> {
        self.parsers.iter().flat_map(|p| p.extensions()).copied().collect()
    }
}

/// Registry with the XML, Java and text parsers
#[must_use]
pub fn default_parsers() -> ParserRegistry {
    let mut registry = ParserRegistry::new();
    registry.register(XmlParser);
    registry.register(JavaParser);
    registry.register(TextParser::default());
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use jpm_tree::TextDocument;

    struct UpperParser;

    impl DocumentParser for UpperParser {
        fn kind(&self) -> DocumentKind {
            DocumentKind::Text
        }

        fn parse(&self, _path: &Path, content: &str) -> Result<Document, ParseError> {
            Ok(TextDocument::new(content.to_uppercase()).into())
        }

        fn extensions(&self) -> &[&str] {
            &["jelly"]
        }

        fn priority(&self) -> i32 {
            10
        }
    }

    #[test]
    fn parser_can_parse_by_extension() {
        assert!(XmlParser.can_parse(Path::new("pom.xml")));
        assert!(XmlParser.can_parse(Path::new("/path/to/pom.xml")));
        assert!(!XmlParser.can_parse(Path::new("A.java")));
        assert!(!XmlParser.can_parse(Path::new("pom")));
    }

    #[test]
    fn registry_dispatches_by_extension() {
        let registry = default_parsers();
        let pom = registry.parse(Path::new("pom.xml"), "<project/>").unwrap();
        assert_eq!(pom.kind(), DocumentKind::Xml);
        let java = registry.parse(Path::new("A.java"), "class A {}\n").unwrap();
        assert_eq!(java.kind(), DocumentKind::Java);
        let jelly = registry.parse(Path::new("index.jelly"), "<div/>\n").unwrap();
        assert_eq!(jelly.kind(), DocumentKind::Text);
    }

    #[test]
    fn unknown_extension_is_an_error() {
        let err = default_parsers().parse(Path::new("build.gradle"), "").unwrap_err();
        assert!(matches!(err, ParseError::NoParserForExtension(ext) if ext == "gradle"));
    }

    #[test]
    fn higher_priority_wins() {
        let mut registry = default_parsers();
        registry.register(UpperParser);
        let doc = registry.parse(Path::new("a.jelly"), "<div/>").unwrap();
        assert_eq!(doc.print(), "<DIV/>");
    }

    #[test]
    fn registry_debug() {
        let debug_str = format!("{:?}", default_parsers());
        assert!(debug_str.contains("ParserRegistry"));
        assert!(debug_str.contains("java"));
    }
}
