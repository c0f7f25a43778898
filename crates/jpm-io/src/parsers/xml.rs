//! Lossless XML parser backed by quick-xml
//!
//! Whitespace text, comments, processing instructions and the original
//! attribute text are all kept, so an unedited document prints back to the
//! exact input.

use crate::error::ParseError;
use crate::parsers::DocumentParser;
use im::Vector;
use jpm_tree::{Attribute, Document, DocumentKind, Element, XmlDocument, XmlNode};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::Path;

/// Parses `.xml` files (POMs included) into [`XmlDocument`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlParser;

impl DocumentParser for XmlParser {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Xml
    }

    fn parse(&self, path: &Path, content: &str) -> Result<Document, ParseError> {
        parse_xml(path, content).map(Document::from)
    }

    fn extensions(&self) -> &[&str] {
        &["xml"]
    }
}

/// An element whose end tag has not been read yet
struct Open {
    name: String,
    attributes: Vec<Attribute>,
    raw_attributes: String,
    children: Vector<XmlNode>,
}

impl Open {
    fn new(start: &BytesStart<'_>, path: &Path, offset: u64) -> Result<Self, ParseError> {
        let name_len = start.name().as_ref().len();
        let name = raw(start.name().as_ref());
        let raw_attributes = raw(&start[name_len..]);
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| ParseError::syntax(path, offset, e.to_string()))?;
            let value = attr
                .unescape_value()
                .map_err(|e| ParseError::syntax(path, offset, e.to_string()))?;
            attributes.push(Attribute {
                name: raw(attr.key.as_ref()),
                value: value.into_owned(),
            });
        }
        Ok(Self {
            name,
            attributes,
            raw_attributes,
            children: Vector::new(),
        })
    }

    fn finish(self, self_closing: bool) -> Element {
        Element::from_parts(self.name, self.attributes, self.raw_attributes, self.children, self_closing)
    }
}

fn raw(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Parse XML text into a lossless tree
///
/// # Errors
/// [`ParseError::Syntax`] for malformed markup, [`ParseError::MissingRoot`]
/// when there is no element at all.
pub fn parse_xml(path: &Path, content: &str) -> Result<XmlDocument, ParseError> {
    let mut reader = Reader::from_str(content);
    let mut prolog = Vector::new();
    let mut epilog = Vector::new();
    let mut root: Option<Element> = None;
    let mut stack: Vec<Open> = Vec::new();

    loop {
        let offset = reader.buffer_position();
        let event = reader
            .read_event()
            .map_err(|e| ParseError::syntax(path, reader.error_position(), e.to_string()))?;
        let node = match event {
            Event::Start(start) => {
                stack.push(Open::new(&start, path, offset)?);
                continue;
            }
            Event::End(_) => {
                let open = stack
                    .pop()
                    .ok_or_else(|| ParseError::syntax(path, offset, "end tag without start tag"))?;
                XmlNode::Element(open.finish(false))
            }
            Event::Empty(start) => XmlNode::Element(Open::new(&start, path, offset)?.finish(true)),
            Event::Text(text) => XmlNode::Text(raw(&text)),
            Event::CData(data) => XmlNode::CData(raw(&data)),
            Event::Comment(comment) => XmlNode::Comment(raw(&comment)),
            Event::Decl(decl) => XmlNode::Markup(format!("<?{}?>", raw(&decl))),
            Event::PI(pi) => XmlNode::Markup(format!("<?{}?>", raw(&pi))),
            Event::DocType(doctype) => XmlNode::Markup(format!("<!DOCTYPE {}>", raw(&doctype))),
            Event::Eof => break,
        };

        if let Some(parent) = stack.last_mut() {
            parent.children.push_back(node);
            continue;
        }
        match (node, &root) {
            (XmlNode::Element(element), None) => root = Some(element),
            (XmlNode::Element(_), Some(_)) => {
                return Err(ParseError::syntax(path, offset, "more than one root element"));
            }
            (other, None) => prolog.push_back(other),
            (other, Some(_)) => epilog.push_back(other),
        }
    }

    if let Some(open) = stack.last() {
        return Err(ParseError::syntax(
            path,
            reader.buffer_position(),
            format!("unclosed element <{}>", open.name),
        ));
    }
    let root = root.ok_or_else(|| ParseError::MissingRoot(path.to_path_buf()))?;
    tracing::trace!(path = %path.display(), root = root.name(), "parsed xml");
    Ok(XmlDocument::new(prolog, root, epilog))
}
