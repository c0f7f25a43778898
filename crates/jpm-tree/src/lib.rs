//! JPM Document Trees
//!
//! Immutable document model with pattern matching and structural editing.
//!
//! # Core Concepts
//!
//! - [`Document`]: XML, Java or plain text tree for one source file
//! - [`NodePath`]: Child-index address of a node
//! - [`Matchable`]: Lazy pattern search ([`XmlPattern`], [`JavaPattern`])
//! - [`Editable`]: `replace` / `insert_child` / `remove` returning new documents
//! - [`EditSession`]: A sequence of edits with an [`EditRecord`] per change
//! - [`Markable`]: Visible search markers
//! - [`ContentHash`]: Blake3 fingerprint of printed text
//!
//! # Example
//!
//! ```rust,ignore
//! use jpm_tree::{EditSession, Matchable, XmlPattern};
//!
//! let pattern = XmlPattern::parse("/project/parent/version")?;
//! if let Some(found) = pom.find_one(&pattern)? {
//!     let mut session = EditSession::new(pom.clone());
//!     session.set_text(&found.path, "4.40")?;
//!     let (edited, records) = session.finish();
//! }
//! ```

#![warn(unreachable_pub)]

mod document;
mod edit;
mod hash;
mod java;
mod java_matcher;
mod matcher;
mod path;
mod text;
mod xml;

pub use document::{Document, DocumentKind, Markable, SourceFile};
pub use edit::{
    ChildOrder, EditError, EditKind, EditRecord, EditSession, Editable, Edited, InsertPosition, Shift,
};
pub use hash::ContentHash;
pub use java::{relocate_name, Import, JavaDocument, JavaSegment, MethodName, TypeRef};
pub use java_matcher::{JavaPattern, MethodMatcher, PackageMatcher};
pub use matcher::{ElementPredicate, Match, MatchError, Matchable, XmlMatches, XmlPattern};
pub use path::{NodePath, PathError};
pub use text::TextDocument;
pub use xml::{Attribute, Element, XmlDocument, XmlNode};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
