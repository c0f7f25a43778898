//! Tree Matcher
//!
//! [`Matchable`] is the capability to locate nodes by a pattern. Matching is
//! lazy: [`Matchable::find`] returns an iterator that walks the tree
//! depth-first in document order and yields matches as it reaches them.
//!
//! XML patterns are a small XPath subset:
//! - `/project/properties` - child steps from the root element
//! - `/project/properties/*` - any element name
//! - `//dependency` - descendant step at any depth
//!
//! Shape conditions on the matched element are expressed with composable
//! [`ElementPredicate`]s.

use crate::path::NodePath;
use crate::xml::{Element, XmlDocument, XmlNode};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// A located node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match<'a, N> {
    /// Where the node lives
    pub path: NodePath,
    /// The node itself
    pub node: &'a N,
}

/// Capability to locate nodes in a document
pub trait Matchable {
    /// Node type yielded by matches
    type Node;
    /// Pattern language
    type Pattern: Display + ?Sized;

    /// All nodes matching `pattern`, in document order
    fn find<'a>(&'a self, pattern: &'a Self::Pattern) -> impl Iterator<Item = Match<'a, Self::Node>> + 'a;

    /// The single node matching `pattern`
    ///
    /// # Errors
    /// Returns [`MatchError::Ambiguous`] when more than one node matches.
    fn find_one<'a>(&'a self, pattern: &'a Self::Pattern) -> Result<Option<Match<'a, Self::Node>>, MatchError> {
        let mut matches = self.find(pattern);
        let first = matches.next();
        if first.is_some() {
            let extra = matches.count();
            if extra > 0 {
                return Err(MatchError::Ambiguous {
                    pattern: pattern.to_string(),
                    count: extra + 1,
                });
            }
        }
        Ok(first)
    }

    /// Whether anything matches
    fn contains(&self, pattern: &Self::Pattern) -> bool {
        self.find(pattern).next().is_some()
    }
}

/// Errors from matching
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    /// A pattern expected to be unique matched several nodes
    #[error("pattern '{pattern}' matched {count} nodes, expected at most one")]
    Ambiguous {
        /// The pattern
        pattern: String,
        /// How many nodes matched
        count: usize,
    },

    /// Pattern text could not be parsed
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern text
        pattern: String,
        /// What was wrong
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    axis: Axis,
    name: Option<String>,
}

impl Step {
    fn accepts(&self, name: &str) -> bool {
        self.name.as_deref().is_none_or(|n| n == name)
    }
}

/// Condition on the shape of a matched element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementPredicate {
    /// Has a child element with this name
    HasChild(String),
    /// Has a child element whose trimmed text equals the value
    ChildText {
        /// Child element name
        name: String,
        /// Expected text
        value: String,
    },
    /// Own trimmed text equals the value
    Text(String),
    /// Attribute equals the value
    Attribute {
        /// Attribute name
        name: String,
        /// Expected value
        value: String,
    },
    /// All of
    All(Vec<ElementPredicate>),
    /// Any of
    Any(Vec<ElementPredicate>),
    /// Negation
    Not(Box<ElementPredicate>),
}

impl ElementPredicate {
    /// `<name>value</name>` child
    #[must_use]
    pub fn child_text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::ChildText {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Both conditions
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match self {
            Self::All(mut all) => {
                all.push(other);
                Self::All(all)
            }
            first => Self::All(vec![first, other]),
        }
    }

    /// Either condition
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match self {
            Self::Any(mut any) => {
                any.push(other);
                Self::Any(any)
            }
            first => Self::Any(vec![first, other]),
        }
    }

    /// Negated condition
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Evaluate against an element
    #[must_use]
    pub fn test(&self, element: &Element) -> bool {
        match self {
            Self::HasChild(name) => element.child(name).is_some(),
            Self::ChildText { name, value } => element
                .children_named(name)
                .any(|(_, c)| c.text().as_deref() == Some(value.as_str())),
            Self::Text(value) => element.text().as_deref() == Some(value.as_str()),
            Self::Attribute { name, value } => element.attribute(name) == Some(value.as_str()),
            Self::All(all) => all.iter().all(|p| p.test(element)),
            Self::Any(any) => any.iter().any(|p| p.test(element)),
            Self::Not(inner) => !inner.test(element),
        }
    }
}

impl Display for ElementPredicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::HasChild(name) => write!(f, "{name}"),
            Self::ChildText { name, value } => write!(f, "{name}='{value}'"),
            Self::Text(value) => write!(f, "text()='{value}'"),
            Self::Attribute { name, value } => write!(f, "@{name}='{value}'"),
            Self::All(all) => join(f, all, " and "),
            Self::Any(any) => join(f, any, " or "),
            Self::Not(inner) => write!(f, "not({inner})"),
        }
    }
}

fn join(f: &mut Formatter<'_>, items: &[ElementPredicate], sep: &str) -> fmt::Result {
    f.write_str("(")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{item}")?;
    }
    f.write_str(")")
}

/// Path-and-shape pattern over XML elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlPattern {
    source: String,
    steps: Vec<Step>,
    predicate: Option<ElementPredicate>,
}

impl XmlPattern {
    /// Parse a path expression
    ///
    /// # Errors
    /// Returns [`MatchError::InvalidPattern`] for relative or empty steps.
    pub fn parse(expression: &str) -> Result<Self, MatchError> {
        let invalid = |reason: &str| MatchError::InvalidPattern {
            pattern: expression.to_string(),
            reason: reason.to_string(),
        };
        if !expression.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }
        let mut steps = Vec::new();
        let mut rest = expression;
        while !rest.is_empty() {
            let (axis, tail) = if let Some(tail) = rest.strip_prefix("//") {
                (Axis::Descendant, tail)
            } else if let Some(tail) = rest.strip_prefix('/') {
                (Axis::Child, tail)
            } else {
                return Err(invalid("expected '/'"));
            };
            let end = tail.find('/').unwrap_or(tail.len());
            let name = &tail[..end];
            if name.is_empty() {
                return Err(invalid("empty step"));
            }
            if name != "*" && !name.chars().all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')) {
                return Err(invalid("step is not an element name"));
            }
            steps.push(Step {
                axis,
                name: (name != "*").then(|| name.to_string()),
            });
            rest = &tail[end..];
        }
        Ok(Self {
            source: expression.to_string(),
            steps,
            predicate: None,
        })
    }

    /// Add a shape condition on the matched element
    #[must_use]
    pub fn with(mut self, predicate: ElementPredicate) -> Self {
        self.predicate = Some(match self.predicate.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
        self
    }

    /// Whether an element reached through `chain` (root first) matches
    #[must_use]
    pub fn matches(&self, chain: &[&str], element: &Element) -> bool {
        chain_matches(&self.steps, chain) && self.predicate.as_ref().is_none_or(|p| p.test(element))
    }

    fn max_depth(&self) -> Option<usize> {
        self.steps
            .iter()
            .all(|s| s.axis == Axis::Child)
            .then_some(self.steps.len())
    }
}

fn chain_matches(steps: &[Step], chain: &[&str]) -> bool {
    let Some((step, rest)) = steps.split_first() else {
        return chain.is_empty();
    };
    match step.axis {
        Axis::Child => chain
            .split_first()
            .is_some_and(|(name, tail)| step.accepts(name) && chain_matches(rest, tail)),
        Axis::Descendant => {
            (0..chain.len()).any(|skip| step.accepts(chain[skip]) && chain_matches(rest, &chain[skip + 1..]))
        }
    }
}

impl FromStr for XmlPattern {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for XmlPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)?;
        if let Some(predicate) = &self.predicate {
            write!(f, "[{predicate}]")?;
        }
        Ok(())
    }
}

/// Depth-first walk over elements yielding pattern matches
pub struct XmlMatches<'a> {
    pattern: &'a XmlPattern,
    stack: Vec<(NodePath, &'a Element)>,
    chain: Vec<&'a str>,
    max_depth: Option<usize>,
}

impl<'a> Iterator for XmlMatches<'a> {
    type Item = Match<'a, Element>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((path, element)) = self.stack.pop() {
            self.chain.truncate(path.len());
            self.chain.push(element.name());
            let depth = self.chain.len();
            if self.max_depth.is_none_or(|max| depth < max) {
                for (index, node) in element.children().iter().enumerate().rev() {
                    if let XmlNode::Element(child) = node {
                        self.stack.push((path.child(index), child));
                    }
                }
            }
            if self.pattern.matches(&self.chain, element) {
                return Some(Match { path, node: element });
            }
        }
        None
    }
}

impl Matchable for XmlDocument {
    type Node = Element;
    type Pattern = XmlPattern;

    fn find<'a>(&'a self, pattern: &'a XmlPattern) -> impl Iterator<Item = Match<'a, Element>> + 'a {
        XmlMatches {
            pattern,
            stack: vec![(NodePath::root(), self.root())],
            chain: Vec::new(),
            max_depth: pattern.max_depth(),
        }
    }
}
