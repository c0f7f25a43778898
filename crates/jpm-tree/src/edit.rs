//! Node Editor
//!
//! [`Editable`] documents support three structural primitives, each of
//! which returns a new document and leaves the receiver untouched:
//!
//! - [`Editable::replace`] swaps the node at a path
//! - [`Editable::insert_child`] adds a node under a parent at an
//!   [`InsertPosition`]
//! - [`Editable::remove`] drops the node at a path
//!
//! XML edits keep the surrounding layout: inserted elements copy the
//! indentation of their new siblings, freshly built subtrees are laid out
//! one indent level deeper, and removals take the preceding whitespace with
//! them so no blank lines are left behind.
//!
//! [`EditSession`] strings primitives together and keeps an [`EditRecord`]
//! per change, rebasing earlier records as later edits shift paths.

use crate::java::{JavaDocument, JavaSegment};
use crate::path::NodePath;
use crate::text::TextDocument;
use crate::xml::{Element, XmlDocument, XmlNode};
use im::Vector;
use serde::{Deserialize, Serialize};

/// Indent used when a document gives no hint of its own
const DEFAULT_INDENT: &str = "    ";

/// Conventional ordering of child element names for a schema type
///
/// Elements missing from the list sort after all listed ones.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChildOrder {
    names: Vec<String>,
}

impl ChildOrder {
    /// Ordering from a list of names
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Position of `name` in the ordering
    #[must_use]
    pub fn rank(&self, name: &str) -> usize {
        self.names.iter().position(|n| n == name).unwrap_or(self.names.len())
    }
}

/// Where [`Editable::insert_child`] places a new node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertPosition {
    /// Before all existing children
    First,
    /// After all existing children
    Last,
    /// Before the n-th existing child (element ordinal for XML)
    At(usize),
    /// Following a schema's conventional ordering
    Ordered(ChildOrder),
}

/// Kind of structural change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditKind {
    /// Node swapped
    Replace,
    /// Node added
    Insert,
    /// Node dropped
    Remove,
}

/// How an edit moved sibling paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shift {
    /// No sibling moved
    None,
    /// `count` nodes now start at `at`
    Inserted {
        /// First inserted position
        at: NodePath,
        /// Number of inserted nodes
        count: usize,
    },
    /// `count` nodes starting at `at` are gone
    Removed {
        /// First removed position
        at: NodePath,
        /// Number of removed nodes
        count: usize,
    },
}

/// Outcome of one primitive edit
#[derive(Debug, Clone)]
pub struct Edited<D> {
    /// The new document
    pub document: D,
    /// Path of the replaced or inserted node in the new document
    pub target: NodePath,
    /// Effect on sibling paths
    pub shift: Shift,
}

/// A change made by an [`EditSession`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRecord {
    /// Path in the session's current document
    pub target: NodePath,
    /// Stable, human-readable address of the target
    pub locator: String,
    /// What happened
    pub kind: EditKind,
    /// Printed form of the new node, `None` for removals
    pub value: Option<String>,
}

/// Errors from structural edits
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    /// Path does not address a node
    #[error("no node at {path}")]
    NoSuchNode {
        /// The dangling path
        path: String,
    },

    /// Operation needs an element but the path addresses something else
    #[error("node at {path} is not an element")]
    NotAnElement {
        /// The offending path
        path: String,
    },

    /// The root can be replaced but not removed or given siblings
    #[error("cannot {operation} the document root")]
    Root {
        /// Attempted operation
        operation: &'static str,
    },

    /// Document kind does not support the operation
    #[error("{operation} is not supported on {kind} documents")]
    Unsupported {
        /// Attempted operation
        operation: &'static str,
        /// Document kind
        kind: &'static str,
    },
}

/// Capability to produce structurally edited copies of a document
pub trait Editable: Sized {
    /// Node type accepted by the primitives
    type Node;

    /// Swap the node at `path`
    ///
    /// # Errors
    /// Fails when `path` does not address a node.
    fn replace(&self, path: &NodePath, node: Self::Node) -> Result<Edited<Self>, EditError>;

    /// Add `node` as a child of `parent`
    ///
    /// # Errors
    /// Fails when `parent` does not address a container.
    fn insert_child(
        &self,
        parent: &NodePath,
        node: Self::Node,
        position: &InsertPosition,
    ) -> Result<Edited<Self>, EditError>;

    /// Drop the node at `path`
    ///
    /// # Errors
    /// Fails when `path` does not address a removable node.
    fn remove(&self, path: &NodePath) -> Result<Edited<Self>, EditError>;

    /// Stable address of `path` for diagnostics and conflict detection
    fn locator(&self, path: &NodePath) -> String;

    /// Printed form of the node at `path`
    fn printed_at(&self, path: &NodePath) -> Option<String>;

    /// Printed form of a detached node
    fn print_node(node: &Self::Node) -> String;
}

fn no_such(path: &NodePath) -> EditError {
    EditError::NoSuchNode {
        path: path.to_string(),
    }
}

fn indent_before(parent: &Element, index: usize) -> Option<String> {
    let previous = index.checked_sub(1).and_then(|i| parent.children().get(i))?;
    match previous {
        XmlNode::Text(text) if text.chars().all(char::is_whitespace) => {
            text.rfind('\n').map(|nl| text[nl + 1..].to_string())
        }
        _ => None,
    }
}

fn is_fresh(element: &Element) -> bool {
    element.has_child_elements() && !element.children().iter().any(|c| matches!(c, XmlNode::Text(_)))
}

/// Lay out a freshly built subtree whose own indentation is `indent`
fn layout(node: XmlNode, indent: &str, unit: &str) -> XmlNode {
    let XmlNode::Element(element) = node else {
        return node;
    };
    if !is_fresh(&element) {
        return XmlNode::Element(element);
    }
    let inner = format!("{indent}{unit}");
    let mut children = Vector::new();
    for child in element.children() {
        children.push_back(XmlNode::Text(format!("\n{inner}")));
        children.push_back(layout(child.clone(), &inner, unit));
    }
    children.push_back(XmlNode::Text(format!("\n{indent}")));
    XmlNode::Element(element.with_children(children))
}

impl XmlDocument {
    /// Indentation step used by the document, four spaces when unknown
    #[must_use]
    pub fn indent_unit(&self) -> String {
        self.root()
            .child_elements()
            .find_map(|(i, _)| indent_before(self.root(), i))
            .filter(|unit| !unit.is_empty())
            .unwrap_or_else(|| DEFAULT_INDENT.to_string())
    }

    /// Indentation in front of the element at `path`
    fn indent_of(&self, path: &NodePath) -> String {
        match (path.parent(), path.last()) {
            (Some(parent), Some(index)) => self
                .element_at(&parent)
                .and_then(|p| indent_before(p, index))
                .unwrap_or_default(),
            _ => String::new(),
        }
    }

    /// Indentation for children of the element at `parent`
    fn child_indent(&self, parent: &NodePath, element: &Element) -> String {
        element
            .child_elements()
            .next()
            .and_then(|(i, _)| indent_before(element, i))
            .unwrap_or_else(|| format!("{}{}", self.indent_of(parent), self.indent_unit()))
    }

    fn ordinal_for(element: &Element, node: &XmlNode, position: &InsertPosition) -> usize {
        let count = element.child_elements().count();
        match position {
            InsertPosition::First => 0,
            InsertPosition::Last => count,
            InsertPosition::At(n) => (*n).min(count),
            InsertPosition::Ordered(order) => {
                let rank = node.as_element().map_or(usize::MAX, |e| order.rank(e.name()));
                element
                    .child_elements()
                    .position(|(_, e)| order.rank(e.name()) > rank)
                    .unwrap_or(count)
            }
        }
    }
}

impl Editable for XmlDocument {
    type Node = XmlNode;

    fn replace(&self, path: &NodePath, node: XmlNode) -> Result<Edited<Self>, EditError> {
        let Some((&index, parent_segments)) = path.segments().split_last() else {
            let XmlNode::Element(root) = node else {
                return Err(EditError::NotAnElement {
                    path: path.to_string(),
                });
            };
            return Ok(Edited {
                document: self.with_root(root),
                target: NodePath::root(),
                shift: Shift::None,
            });
        };
        let parent = NodePath::from(parent_segments);
        let node = layout(node, &self.indent_of(path), &self.indent_unit());
        let document = self
            .update_element(&parent, |p| {
                if index >= p.children().len() {
                    return Err(no_such(path));
                }
                let mut new = p.clone();
                new.children_mut().set(index, node);
                Ok(new)
            })?
            .ok_or_else(|| no_such(path))?;
        Ok(Edited {
            document,
            target: path.clone(),
            shift: Shift::None,
        })
    }

    fn insert_child(
        &self,
        parent: &NodePath,
        node: XmlNode,
        position: &InsertPosition,
    ) -> Result<Edited<Self>, EditError> {
        let element = self.element_at(parent).ok_or_else(|| EditError::NotAnElement {
            path: parent.to_string(),
        })?;
        let unit = self.indent_unit();
        let indent = self.child_indent(parent, element);
        let node = layout(node, &indent, &unit);
        let ordinal = Self::ordinal_for(element, &node, position);
        let raw: Vec<usize> = element.child_elements().map(|(i, _)| i).collect();
        let multiline = element
            .children()
            .iter()
            .any(|c| matches!(c, XmlNode::Text(t) if t.contains('\n')));
        let only_whitespace = element.children().iter().all(XmlNode::is_whitespace);

        let mut new = element.clone();
        let (target, shift) = if raw.is_empty() && only_whitespace {
            let closing = format!("\n{}", self.indent_of(parent));
            let old_len = new.children().len();
            let children = new.children_mut();
            children.clear();
            children.push_back(XmlNode::Text(format!("\n{indent}")));
            children.push_back(node);
            children.push_back(XmlNode::Text(closing));
            (
                parent.child(1),
                Shift::Inserted {
                    at: parent.child(0),
                    count: 3usize.saturating_sub(old_len),
                },
            )
        } else if !multiline || raw.is_empty() {
            let at = if ordinal < raw.len() { raw[ordinal] } else { new.children().len() };
            new.children_mut().insert(at, node);
            (parent.child(at), Shift::Inserted { at: parent.child(at), count: 1 })
        } else if ordinal < raw.len() {
            let at = raw[ordinal];
            let children = new.children_mut();
            children.insert(at, XmlNode::Text(format!("\n{indent}")));
            children.insert(at, node);
            (parent.child(at), Shift::Inserted { at: parent.child(at), count: 2 })
        } else {
            let at = raw[raw.len() - 1] + 1;
            let children = new.children_mut();
            children.insert(at, node);
            children.insert(at, XmlNode::Text(format!("\n{indent}")));
            (parent.child(at + 1), Shift::Inserted { at: parent.child(at), count: 2 })
        };

        let document = self
            .update_element::<EditError>(parent, |_| Ok(new))?
            .ok_or_else(|| no_such(parent))?;
        Ok(Edited { document, target, shift })
    }

    fn remove(&self, path: &NodePath) -> Result<Edited<Self>, EditError> {
        let (Some(parent), Some(index)) = (path.parent(), path.last()) else {
            return Err(EditError::Root { operation: "remove" });
        };
        let element = self.element_at(&parent).ok_or_else(|| no_such(path))?;
        if index >= element.children().len() {
            return Err(no_such(path));
        }
        let with_whitespace = index > 0
            && element
                .children()
                .get(index - 1)
                .is_some_and(XmlNode::is_whitespace);
        let (start, count) = if with_whitespace { (index - 1, 2) } else { (index, 1) };
        let mut new = element.clone();
        let children = new.children_mut();
        for _ in 0..count {
            children.remove(start);
        }
        let document = self
            .update_element::<EditError>(&parent, |_| Ok(new))?
            .ok_or_else(|| no_such(path))?;
        Ok(Edited {
            document,
            target: path.clone(),
            shift: Shift::Removed {
                at: parent.child(start),
                count,
            },
        })
    }

    fn locator(&self, path: &NodePath) -> String {
        XmlDocument::locator(self, path)
    }

    fn printed_at(&self, path: &NodePath) -> Option<String> {
        if path.is_root() {
            return Some(self.root().to_string());
        }
        self.node_at(path).map(ToString::to_string)
    }

    fn print_node(node: &XmlNode) -> String {
        node.to_string()
    }
}

impl Editable for JavaDocument {
    type Node = JavaSegment;

    fn replace(&self, path: &NodePath, node: JavaSegment) -> Result<Edited<Self>, EditError> {
        let index = match path.segments() {
            [index] if *index < self.segments().len() => *index,
            _ => return Err(no_such(path)),
        };
        let mut document = self.clone();
        document.segments_mut().set(index, node);
        Ok(Edited {
            document,
            target: path.clone(),
            shift: Shift::None,
        })
    }

    fn insert_child(
        &self,
        parent: &NodePath,
        node: JavaSegment,
        position: &InsertPosition,
    ) -> Result<Edited<Self>, EditError> {
        if !parent.is_root() {
            return Err(no_such(parent));
        }
        let len = self.segments().len();
        let index = match position {
            InsertPosition::First => 0,
            InsertPosition::At(n) => (*n).min(len),
            InsertPosition::Last | InsertPosition::Ordered(_) => len,
        };
        let mut document = self.clone();
        document.segments_mut().insert(index, node);
        let target = NodePath::new([index]);
        Ok(Edited {
            document,
            target: target.clone(),
            shift: Shift::Inserted { at: target, count: 1 },
        })
    }

    fn remove(&self, path: &NodePath) -> Result<Edited<Self>, EditError> {
        let index = match path.segments() {
            [] => return Err(EditError::Root { operation: "remove" }),
            [index] if *index < self.segments().len() => *index,
            _ => return Err(no_such(path)),
        };
        let mut document = self.clone();
        document.segments_mut().remove(index);
        Ok(Edited {
            document,
            target: path.clone(),
            shift: Shift::Removed {
                at: path.clone(),
                count: 1,
            },
        })
    }

    fn locator(&self, path: &NodePath) -> String {
        format!("segment{path}")
    }

    fn printed_at(&self, path: &NodePath) -> Option<String> {
        match path.segments() {
            [index] => self.segment(*index).map(ToString::to_string),
            _ => None,
        }
    }

    fn print_node(node: &JavaSegment) -> String {
        node.to_string()
    }
}

impl Editable for TextDocument {
    type Node = String;

    fn replace(&self, path: &NodePath, node: String) -> Result<Edited<Self>, EditError> {
        if !path.is_root() {
            return Err(no_such(path));
        }
        Ok(Edited {
            document: TextDocument::new(node),
            target: NodePath::root(),
            shift: Shift::None,
        })
    }

    fn insert_child(&self, _: &NodePath, _: String, _: &InsertPosition) -> Result<Edited<Self>, EditError> {
        Err(EditError::Unsupported {
            operation: "insert",
            kind: "text",
        })
    }

    fn remove(&self, _: &NodePath) -> Result<Edited<Self>, EditError> {
        Err(EditError::Unsupported {
            operation: "remove",
            kind: "text",
        })
    }

    fn locator(&self, _: &NodePath) -> String {
        "text".to_string()
    }

    fn printed_at(&self, path: &NodePath) -> Option<String> {
        path.is_root().then(|| self.text().to_string())
    }

    fn print_node(node: &String) -> String {
        node.clone()
    }
}

/// A run of edits against one document
///
/// Replacing a node with one that prints the same is not recorded, so a
/// recipe that re-asserts an existing value leaves the session unchanged.
/// The replacement still lands, which keeps attribution such as resolved
/// Java names current for later recipes.
#[derive(Debug, Clone)]
pub struct EditSession<D> {
    document: D,
    records: Vec<EditRecord>,
}

impl<D: Editable> EditSession<D> {
    /// Start editing `document`
    #[must_use]
    pub fn new(document: D) -> Self {
        Self {
            document,
            records: Vec::new(),
        }
    }

    /// Current state of the document
    #[inline]
    #[must_use]
    pub fn document(&self) -> &D {
        &self.document
    }

    /// Changes so far
    #[inline]
    #[must_use]
    pub fn records(&self) -> &[EditRecord] {
        &self.records
    }

    /// Whether anything changed
    #[inline]
    #[must_use]
    pub fn is_changed(&self) -> bool {
        !self.records.is_empty()
    }

    /// See [`Editable::replace`]
    ///
    /// # Errors
    /// Propagates [`EditError`].
    pub fn replace(&mut self, path: &NodePath, node: D::Node) -> Result<(), EditError> {
        let value = D::print_node(&node);
        let edited = self.document.replace(path, node)?;
        if self.document.printed_at(path).as_deref() == Some(value.as_str()) {
            self.document = edited.document;
            return Ok(());
        }
        self.commit(edited, EditKind::Replace);
        Ok(())
    }

    /// See [`Editable::insert_child`]; returns the new node's path
    ///
    /// # Errors
    /// Propagates [`EditError`].
    pub fn insert_child(
        &mut self,
        parent: &NodePath,
        node: D::Node,
        position: &InsertPosition,
    ) -> Result<NodePath, EditError> {
        let edited = self.document.insert_child(parent, node, position)?;
        let target = edited.target.clone();
        self.commit(edited, EditKind::Insert);
        Ok(target)
    }

    /// See [`Editable::remove`]
    ///
    /// # Errors
    /// Propagates [`EditError`].
    pub fn remove(&mut self, path: &NodePath) -> Result<(), EditError> {
        let locator = self.document.locator(path);
        let edited = self.document.remove(path)?;
        self.rebase(&edited.shift);
        self.records.push(EditRecord {
            target: edited.target,
            locator,
            kind: EditKind::Remove,
            value: None,
        });
        self.document = edited.document;
        Ok(())
    }

    /// Final document and the edits that produced it
    #[must_use]
    pub fn finish(self) -> (D, Vec<EditRecord>) {
        (self.document, self.records)
    }

    fn commit(&mut self, edited: Edited<D>, kind: EditKind) {
        self.rebase(&edited.shift);
        let value = edited.document.printed_at(&edited.target);
        let locator = edited.document.locator(&edited.target);
        self.records.push(EditRecord {
            target: edited.target,
            locator,
            kind,
            value,
        });
        self.document = edited.document;
    }

    fn rebase(&mut self, shift: &Shift) {
        match shift {
            Shift::None => {}
            Shift::Inserted { at, count } => {
                for record in &mut self.records {
                    record.target = record.target.rebase_after_insert(at, *count);
                }
            }
            Shift::Removed { at, count } => {
                for record in &mut self.records {
                    if let Some(rebased) = record.target.rebase_after_remove(at, *count) {
                        record.target = rebased;
                    }
                }
            }
        }
    }
}

impl EditSession<XmlDocument> {
    /// Replace the text content of the element at `path`
    ///
    /// # Errors
    /// Fails when `path` is not an element.
    pub fn set_text(&mut self, path: &NodePath, text: &str) -> Result<(), EditError> {
        let element = self.document.element_at(path).ok_or_else(|| EditError::NotAnElement {
            path: path.to_string(),
        })?;
        if element.text().as_deref() == Some(text) {
            return Ok(());
        }
        let updated = element.set_text(text);
        self.replace(path, XmlNode::Element(updated))
    }
}
