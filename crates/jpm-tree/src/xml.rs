//! Lossless XML element tree
//!
//! [`XmlDocument`] keeps everything needed to print a document back byte for
//! byte: whitespace text nodes, comments, raw attribute text and the
//! self-closing form of empty elements. Children are stored in
//! [`im::Vector`] so an edit only copies the spine from the root to the
//! edited node; every untouched subtree is shared with the previous version.

use crate::path::NodePath;
use im::Vector;
use quick_xml::escape::{escape, partial_escape, unescape};
use std::borrow::Cow;
use std::fmt::{self, Display, Formatter};

/// A parsed XML document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    prolog: Vector<XmlNode>,
    root: Element,
    epilog: Vector<XmlNode>,
}

/// Any node that can appear as the child of an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    /// Nested element
    Element(Element),
    /// Character data in escaped form, exactly as it appears in the source
    Text(String),
    /// Comment body without the `<!--`/`-->` delimiters
    Comment(String),
    /// CDATA body without delimiters
    CData(String),
    /// Verbatim markup: XML declaration, processing instruction or doctype
    Markup(String),
}

/// Attribute with its unescaped value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Qualified name
    pub name: String,
    /// Unescaped value
    pub value: String,
}

/// An XML element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<Attribute>,
    raw_attributes: Option<String>,
    children: Vector<XmlNode>,
    self_closing: bool,
}

impl Element {
    /// Empty element printed as `<name/>`
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            raw_attributes: None,
            children: Vector::new(),
            self_closing: true,
        }
    }

    /// Element holding a single text value, e.g. `<version>4.40</version>`
    #[must_use]
    pub fn with_text(name: impl Into<String>, text: &str) -> Self {
        Self::new(name).set_text(text)
    }

    /// Element as it came out of a parser, with its original attribute text
    #[must_use]
    pub fn from_parts(
        name: impl Into<String>,
        attributes: Vec<Attribute>,
        raw_attributes: String,
        children: Vector<XmlNode>,
        self_closing: bool,
    ) -> Self {
        Self {
            name: name.into(),
            attributes,
            raw_attributes: Some(raw_attributes),
            children,
            self_closing,
        }
    }

    /// Append a child element
    #[must_use]
    pub fn with_child(self, child: Element) -> Self {
        self.with_node(XmlNode::Element(child))
    }

    /// Append any child node
    #[must_use]
    pub fn with_node(mut self, node: XmlNode) -> Self {
        self.children.push_back(node);
        self.self_closing = false;
        self
    }

    /// Set an attribute, dropping the original attribute text
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute { name, value }),
        }
        self.raw_attributes = None;
        self
    }

    /// Replace all children
    #[must_use]
    pub fn with_children(mut self, children: Vector<XmlNode>) -> Self {
        self.self_closing = self.self_closing && children.is_empty();
        self.children = children;
        self
    }

    /// Replace the content with a single text node
    #[must_use]
    pub fn set_text(&self, text: &str) -> Self {
        let mut new = self.clone();
        new.children = Vector::unit(XmlNode::Text(partial_escape(text).into_owned()));
        new.self_closing = false;
        new
    }

    /// Tag name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parsed attributes
    #[inline]
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Attribute value by name
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// All child nodes including whitespace and comments
    #[inline]
    #[must_use]
    pub fn children(&self) -> &Vector<XmlNode> {
        &self.children
    }

    /// Whether the element prints as `<name/>`
    #[inline]
    #[must_use]
    pub fn is_self_closing(&self) -> bool {
        self.self_closing && self.children.is_empty()
    }

    /// Child elements paired with their index in [`Element::children`]
    pub fn child_elements(&self) -> impl Iterator<Item = (usize, &Element)> {
        self.children.iter().enumerate().filter_map(|(i, node)| match node {
            XmlNode::Element(e) => Some((i, e)),
            _ => None,
        })
    }

    /// First child element with the given name
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.child_elements().map(|(_, e)| e).find(|e| e.name == name)
    }

    /// Index of the first child element with the given name
    #[must_use]
    pub fn child_index(&self, name: &str) -> Option<usize> {
        self.child_elements().find(|(_, e)| e.name == name).map(|(i, _)| i)
    }

    /// All child elements with the given name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = (usize, &'a Element)> {
        self.child_elements().filter(move |(_, e)| e.name == name)
    }

    /// Trimmed text of a child element
    #[must_use]
    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name).and_then(Element::text)
    }

    /// Trimmed, unescaped text content
    ///
    /// `None` when the element has child elements.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        let mut out = String::new();
        for node in &self.children {
            match node {
                XmlNode::Element(_) => return None,
                XmlNode::Text(raw) => out.push_str(&unescape(raw).unwrap_or(Cow::Borrowed(raw.as_str()))),
                XmlNode::CData(data) => out.push_str(data),
                XmlNode::Comment(_) | XmlNode::Markup(_) => {}
            }
        }
        Some(out.trim().to_string())
    }

    /// Whether any child element exists
    #[must_use]
    pub fn has_child_elements(&self) -> bool {
        self.child_elements().next().is_some()
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vector<XmlNode> {
        self.self_closing = false;
        &mut self.children
    }

    fn write_attributes(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(raw) = &self.raw_attributes {
            return f.write_str(raw);
        }
        for attr in &self.attributes {
            write!(f, " {}=\"{}\"", attr.name, escape(&attr.value))?;
        }
        Ok(())
    }
}

impl Display for Element {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        self.write_attributes(f)?;
        if self.is_self_closing() {
            return f.write_str("/>");
        }
        f.write_str(">")?;
        for child in &self.children {
            write!(f, "{child}")?;
        }
        write!(f, "</{}>", self.name)
    }
}

impl XmlNode {
    /// Element payload, if this node is an element
    #[inline]
    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Whether this is a text node holding only whitespace
    #[must_use]
    pub fn is_whitespace(&self) -> bool {
        matches!(self, Self::Text(t) if t.chars().all(char::is_whitespace))
    }

    /// Comment node with surrounding spaces, e.g. `<!-- note -->`
    #[must_use]
    pub fn comment(text: &str) -> Self {
        Self::Comment(format!(" {text} "))
    }
}

impl Display for XmlNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element(e) => write!(f, "{e}"),
            Self::Text(t) | Self::Markup(t) => f.write_str(t),
            Self::Comment(c) => write!(f, "<!--{c}-->"),
            Self::CData(c) => write!(f, "<![CDATA[{c}]]>"),
        }
    }
}

impl XmlDocument {
    /// Assemble a document from its three regions
    #[must_use]
    pub fn new(prolog: Vector<XmlNode>, root: Element, epilog: Vector<XmlNode>) -> Self {
        Self { prolog, root, epilog }
    }

    /// Document consisting of just a root element
    #[must_use]
    pub fn from_root(root: Element) -> Self {
        Self::new(Vector::new(), root, Vector::new())
    }

    /// Root element
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Nodes before the root element
    #[inline]
    #[must_use]
    pub fn prolog(&self) -> &Vector<XmlNode> {
        &self.prolog
    }

    /// Nodes after the root element
    #[inline]
    #[must_use]
    pub fn epilog(&self) -> &Vector<XmlNode> {
        &self.epilog
    }

    /// Copy with a different prolog
    #[must_use]
    pub fn with_prolog(&self, prolog: Vector<XmlNode>) -> Self {
        Self {
            prolog,
            ..self.clone()
        }
    }

    /// Copy with a different root element
    #[must_use]
    pub fn with_root(&self, root: Element) -> Self {
        Self {
            root,
            ..self.clone()
        }
    }

    /// Element at `path`, or `None` if the path is dangling or not an element
    #[must_use]
    pub fn element_at(&self, path: &NodePath) -> Option<&Element> {
        let mut current = &self.root;
        for index in path.iter() {
            current = current.children.get(index)?.as_element()?;
        }
        Some(current)
    }

    /// Non-root node at `path`
    #[must_use]
    pub fn node_at(&self, path: &NodePath) -> Option<&XmlNode> {
        let parent = self.element_at(&path.parent()?)?;
        parent.children.get(path.last()?)
    }

    /// Human-readable address such as `/project/dependencies/dependency[2]/version`
    ///
    /// Same-named siblings get a one-based ordinal when there is more than one.
    #[must_use]
    pub fn locator(&self, path: &NodePath) -> String {
        let mut out = format!("/{}", self.root.name);
        let mut current = &self.root;
        for index in path.iter() {
            match current.children.get(index) {
                Some(XmlNode::Element(child)) => {
                    out.push('/');
                    out.push_str(&child.name);
                    let same: Vec<usize> = current.children_named(&child.name).map(|(i, _)| i).collect();
                    if same.len() > 1 {
                        let ordinal = same.iter().position(|&i| i == index).unwrap_or(0) + 1;
                        out.push_str(&format!("[{ordinal}]"));
                    }
                    current = child;
                }
                Some(XmlNode::Comment(_)) => {
                    out.push_str(&format!("/#comment[{index}]"));
                    break;
                }
                Some(_) => {
                    out.push_str(&format!("/#text[{index}]"));
                    break;
                }
                None => {
                    out.push_str(&format!("/?[{index}]"));
                    break;
                }
            }
        }
        out
    }

    /// Rebuild the spine from the root to `path`, transforming the element there
    pub(crate) fn update_element<E>(
        &self,
        path: &NodePath,
        f: impl FnOnce(&Element) -> Result<Element, E>,
    ) -> Result<Option<Self>, E> {
        fn go<E>(
            element: &Element,
            rest: &[usize],
            f: impl FnOnce(&Element) -> Result<Element, E>,
        ) -> Result<Option<Element>, E> {
            let Some((&index, tail)) = rest.split_first() else {
                return f(element).map(Some);
            };
            let Some(XmlNode::Element(child)) = element.children.get(index) else {
                return Ok(None);
            };
            let Some(updated) = go(child, tail, f)? else {
                return Ok(None);
            };
            let mut new = element.clone();
            new.children.set(index, XmlNode::Element(updated));
            Ok(Some(new))
        }

        Ok(go(&self.root, path.segments(), f)?.map(|root| self.with_root(root)))
    }
}

impl Display for XmlDocument {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for node in &self.prolog {
            write!(f, "{node}")?;
        }
        write!(f, "{}", self.root)?;
        for node in &self.epilog {
            write!(f, "{node}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> XmlDocument {
        let parent = Element::new("parent")
            .with_node(XmlNode::Text("\n    ".into()))
            .with_child(Element::with_text("version", "3.40"))
            .with_node(XmlNode::Text("\n  ".into()));
        let root = Element::new("project")
            .with_node(XmlNode::Text("\n  ".into()))
            .with_child(parent)
            .with_node(XmlNode::Text("\n".into()));
        XmlDocument::from_root(root)
    }

    #[test]
    fn prints_structure() {
        assert_eq!(
            sample().to_string(),
            "<project>\n  <parent>\n    <version>3.40</version>\n  </parent>\n</project>"
        );
    }

    #[test]
    fn empty_element_is_self_closing() {
        assert_eq!(Element::new("relativePath").to_string(), "<relativePath/>");
        let raw = Element::from_parts("relativePath", vec![], " ".into(), Vector::new(), true);
        assert_eq!(raw.to_string(), "<relativePath />");
    }

    #[test]
    fn text_is_escaped_and_unescaped() {
        let e = Element::with_text("description", "a < b & c");
        assert_eq!(e.to_string(), "<description>a &lt; b &amp; c</description>");
        assert_eq!(e.text().as_deref(), Some("a < b & c"));
    }

    #[test]
    fn navigation_by_path() {
        let doc = sample();
        let path = NodePath::new([1, 1]);
        assert_eq!(doc.element_at(&path).map(Element::name), Some("version"));
        assert_eq!(doc.locator(&path), "/project/parent/version");
        assert!(doc.element_at(&NodePath::new([0])).is_none());
        assert!(doc.node_at(&NodePath::new([0])).is_some_and(XmlNode::is_whitespace));
    }

    #[test]
    fn locator_numbers_repeated_siblings() {
        let root = Element::new("dependencies")
            .with_child(Element::new("dependency"))
            .with_child(Element::new("dependency"));
        let doc = XmlDocument::from_root(root);
        assert_eq!(doc.locator(&NodePath::new([1])), "/dependencies/dependency[2]");
    }

    #[test]
    fn update_shares_untouched_nodes() {
        let doc = sample();
        let updated = doc
            .update_element::<()>(&NodePath::new([1, 1]), |e| Ok(e.set_text("4.40")))
            .unwrap()
            .unwrap();
        assert!(updated.to_string().contains("<version>4.40</version>"));
        assert!(doc.to_string().contains("<version>3.40</version>"));
    }

    #[test]
    fn attributes_print_escaped() {
        let e = Element::new("a").with_attribute("href", "x\"y");
        assert_eq!(e.attribute("href"), Some("x\"y"));
        assert_eq!(e.to_string(), "<a href=\"x&quot;y\"/>");
    }
}
