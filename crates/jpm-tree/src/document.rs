//! Documents and source files
//!
//! [`Document`] is the closed set of tree shapes recipes operate on. A
//! [`SourceFile`] pairs a document with its project-relative path.

use crate::hash::ContentHash;
use crate::java::{JavaDocument, JavaSegment};
use crate::text::TextDocument;
use crate::xml::{XmlDocument, XmlNode};
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};

const MARKER_OPEN: &str = "~~(";
const MARKER_CLOSE: &str = ")~~>";

/// Kind of a parsed document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// XML, including Maven POMs
    Xml,
    /// Java compilation unit
    Java,
    /// Anything kept as plain text
    Text,
}

impl DocumentKind {
    /// Lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Xml => "xml",
            Self::Java => "java",
            Self::Text => "text",
        }
    }
}

impl Display for DocumentKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable parsed document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Document {
    /// XML tree
    Xml(XmlDocument),
    /// Java segments
    Java(JavaDocument),
    /// Plain text
    Text(TextDocument),
}

impl Document {
    /// Kind of tree
    #[must_use]
    pub const fn kind(&self) -> DocumentKind {
        match self {
            Self::Xml(_) => DocumentKind::Xml,
            Self::Java(_) => DocumentKind::Java,
            Self::Text(_) => DocumentKind::Text,
        }
    }

    /// XML tree, if this is one
    #[inline]
    #[must_use]
    pub fn as_xml(&self) -> Option<&XmlDocument> {
        match self {
            Self::Xml(doc) => Some(doc),
            _ => None,
        }
    }

    /// Java segments, if this is a Java file
    #[inline]
    #[must_use]
    pub fn as_java(&self) -> Option<&JavaDocument> {
        match self {
            Self::Java(doc) => Some(doc),
            _ => None,
        }
    }

    /// Plain text, if this was not parsed
    #[inline]
    #[must_use]
    pub fn as_text(&self) -> Option<&TextDocument> {
        match self {
            Self::Text(doc) => Some(doc),
            _ => None,
        }
    }

    /// Printed source text
    #[must_use]
    pub fn print(&self) -> String {
        self.to_string()
    }

    /// Fingerprint of the printed text
    #[must_use]
    pub fn content_hash(&self) -> ContentHash {
        ContentHash::of_text(&self.print())
    }

    /// Search markers attached to the document
    #[must_use]
    pub fn markers(&self) -> Vec<String> {
        match self {
            Self::Xml(doc) => doc.markers(),
            Self::Java(doc) => doc.markers(),
            Self::Text(doc) => doc.markers(),
        }
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Xml(doc) => write!(f, "{doc}"),
            Self::Java(doc) => write!(f, "{doc}"),
            Self::Text(doc) => write!(f, "{doc}"),
        }
    }
}

impl From<XmlDocument> for Document {
    fn from(doc: XmlDocument) -> Self {
        Self::Xml(doc)
    }
}

impl From<JavaDocument> for Document {
    fn from(doc: JavaDocument) -> Self {
        Self::Java(doc)
    }
}

impl From<TextDocument> for Document {
    fn from(doc: TextDocument) -> Self {
        Self::Text(doc)
    }
}

/// Capability to carry visible search markers
///
/// A marker is a comment in the document's own syntax, e.g.
/// `<!--~~(2.303.3)~~>-->` in XML, so a marked document is still valid
/// source and the marker shows up in a diff.
pub trait Markable: Sized {
    /// Copy with a marker carrying `description`
    #[must_use]
    fn mark(&self, description: &str) -> Self;

    /// Descriptions of all markers present
    fn markers(&self) -> Vec<String>;

    /// Whether any marker is present
    fn is_marked(&self) -> bool {
        !self.markers().is_empty()
    }
}

fn marker_text(description: &str) -> String {
    format!("{MARKER_OPEN}{description}{MARKER_CLOSE}")
}

fn parse_marker(text: &str) -> Option<String> {
    text.strip_prefix(MARKER_OPEN)?
        .strip_suffix(MARKER_CLOSE)
        .map(ToString::to_string)
}

impl Markable for XmlDocument {
    fn mark(&self, description: &str) -> Self {
        let mut prolog = self.prolog().clone();
        prolog.push_back(XmlNode::Comment(marker_text(description)));
        self.with_prolog(prolog)
    }

    fn markers(&self) -> Vec<String> {
        self.prolog()
            .iter()
            .filter_map(|node| match node {
                XmlNode::Comment(c) => parse_marker(c),
                _ => None,
            })
            .collect()
    }
}

impl Markable for JavaDocument {
    fn mark(&self, description: &str) -> Self {
        let mut segments = self.segments().clone();
        segments.push_front(JavaSegment::Source(format!("/*{}*/", marker_text(description))));
        self.with_segments(segments)
    }

    fn markers(&self) -> Vec<String> {
        match self.segments().front() {
            Some(JavaSegment::Source(text)) => text
                .strip_prefix("/*")
                .and_then(|t| t.split_once("*/"))
                .and_then(|(inner, _)| parse_marker(inner))
                .into_iter()
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl Markable for TextDocument {
    fn mark(&self, description: &str) -> Self {
        TextDocument::new(format!("{}{}", marker_text(description), self.text()))
    }

    fn markers(&self) -> Vec<String> {
        self.text()
            .strip_prefix(MARKER_OPEN)
            .and_then(|rest| rest.split_once(MARKER_CLOSE))
            .map(|(inner, _)| vec![inner.to_string()])
            .unwrap_or_default()
    }
}

/// A document together with its path relative to the project root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    path: PathBuf,
    document: Document,
}

impl SourceFile {
    /// Pair a path with its document
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, document: impl Into<Document>) -> Self {
        Self {
            path: path.into(),
            document: document.into(),
        }
    }

    /// Project-relative path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parsed document
    #[inline]
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Same path, different document
    #[must_use]
    pub fn with_document(&self, document: impl Into<Document>) -> Self {
        Self {
            path: self.path.clone(),
            document: document.into(),
        }
    }

    /// File name component
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    /// Whether this is a Maven `pom.xml`
    #[must_use]
    pub fn is_pom(&self) -> bool {
        self.file_name() == Some("pom.xml") && self.document.as_xml().is_some()
    }

    /// Whether the path has the given extension
    #[must_use]
    pub fn has_extension(&self, extension: &str) -> bool {
        self.path.extension().and_then(|e| e.to_str()) == Some(extension)
    }
}
