//! Plain text parser

use crate::error::ParseError;
use crate::parsers::DocumentParser;
use jpm_tree::{Document, DocumentKind, TextDocument};
use std::path::Path;

const DEFAULT_EXTENSIONS: &[&str] = &["jelly", "properties", "txt", "md"];

/// Keeps content verbatim as a [`TextDocument`]
#[derive(Debug, Clone)]
pub struct TextParser {
    extensions: Vec<&'static str>,
}

impl TextParser {
    /// Text parser for the given extensions
    #[must_use]
    pub fn new(extensions: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            extensions: extensions.into_iter().collect(),
        }
    }
}

impl Default for TextParser {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS.iter().copied())
    }
}

impl DocumentParser for TextParser {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Text
    }

    fn parse(&self, _path: &Path, content: &str) -> Result<Document, ParseError> {
        Ok(TextDocument::new(content).into())
    }

    fn extensions(&self) -> &[&str] {
        &self.extensions
    }

    fn priority(&self) -> i32 {
        -10
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_content_verbatim() {
        let content = "<?jelly escape-by-default='true'?>\r\n<div/>\r\n";
        let doc = TextParser::default().parse(Path::new("index.jelly"), content).unwrap();
        assert_eq!(doc.print(), content);
        assert_eq!(doc.as_text().unwrap().line_ending(), "\r\n");
    }

    #[test]
    fn custom_extensions() {
        let parser = TextParser::new(["groovy"]);
        assert!(parser.can_parse(Path::new("Jenkinsfile.groovy")));
        assert!(!parser.can_parse(Path::new("index.jelly")));
    }
}
