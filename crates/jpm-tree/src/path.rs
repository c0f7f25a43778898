//! Node paths for addressing within documents
//!
//! A [`NodePath`] is the ordered list of child indices leading from a
//! document's root node to the addressed node. Paths are positional: an
//! edit that inserts or removes a sibling shifts the paths that follow it,
//! which is why [`NodePath::rebase_after_insert`] and
//! [`NodePath::rebase_after_remove`] exist.

use smallvec::SmallVec;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Path of child indices from the document root
///
/// # Examples
/// - `/` is the root element of an XML document
/// - `/1/3` is the fourth child of the second child of the root
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NodePath(SmallVec<[usize; 8]>);

impl NodePath {
    /// Create path from child indices
    #[inline]
    #[must_use]
    pub fn new(segments: impl IntoIterator<Item = usize>) -> Self {
        Self(segments.into_iter().collect())
    }

    /// The root path
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(SmallVec::new())
    }

    /// Child indices from root to leaf
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[usize] {
        &self.0
    }

    /// Depth of the addressed node
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if this is the root path
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Get parent path (if not root)
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.0.split_last().map(|(_, rest)| Self(rest.iter().copied().collect()))
    }

    /// Index of the addressed node within its parent
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Append a child index, returning new path
    #[inline]
    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        let mut new = self.clone();
        new.0.push(index);
        new
    }

    /// Check if this path is a prefix of another
    #[inline]
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        other.0.starts_with(&self.0)
    }

    /// Strict prefix
    #[inline]
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        self.0.len() < other.0.len() && self.is_prefix_of(other)
    }

    /// Check if paths overlap (one contains the other)
    #[inline]
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.is_prefix_of(other) || other.is_prefix_of(self)
    }

    /// Get relative path from ancestor
    ///
    /// # Errors
    /// Returns error if `self` is not inside `ancestor`
    pub fn relative_to(&self, ancestor: &Self) -> Result<Self, PathError> {
        if !ancestor.is_prefix_of(self) {
            return Err(PathError::NotDescendant {
                path: self.to_string(),
                ancestor: ancestor.to_string(),
            });
        }
        Ok(Self(self.0[ancestor.0.len()..].iter().copied().collect()))
    }

    /// Adjust this path after `count` siblings were inserted at `inserted`
    ///
    /// Paths at or after the insertion point under the same parent shift
    /// right. Everything else is untouched.
    #[must_use]
    pub fn rebase_after_insert(&self, inserted: &Self, count: usize) -> Self {
        let Some((&index, parent)) = inserted.0.split_last() else {
            return self.clone();
        };
        let depth = parent.len();
        if self.0.len() > depth && self.0.starts_with(parent) && self.0[depth] >= index {
            let mut new = self.clone();
            new.0[depth] += count;
            return new;
        }
        self.clone()
    }

    /// Adjust this path after `count` siblings were removed at `removed`
    ///
    /// Returns `None` when this path pointed into the removed range.
    #[must_use]
    pub fn rebase_after_remove(&self, removed: &Self, count: usize) -> Option<Self> {
        let Some((&index, parent)) = removed.0.split_last() else {
            return None;
        };
        let depth = parent.len();
        if self.0.len() > depth && self.0.starts_with(parent) {
            let own = self.0[depth];
            if own >= index && own < index + count {
                return None;
            }
            if own >= index + count {
                let mut new = self.clone();
                new.0[depth] -= count;
                return Some(new);
            }
        }
        Some(self.clone())
    }

    /// Iterator over indices from root to leaf
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }
}

impl Display for NodePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for index in &self.0 {
            write!(f, "/{index}")?;
        }
        Ok(())
    }
}

impl FromStr for NodePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(rest) = s.strip_prefix('/') else {
            return Err(PathError::NotAbsolute(s.to_string()));
        };
        if rest.is_empty() {
            return Ok(Self::root());
        }
        rest.split('/')
            .map(|seg| {
                if seg.is_empty() {
                    Err(PathError::EmptySegment)
                } else {
                    seg.parse::<usize>()
                        .map_err(|_| PathError::InvalidSegment(seg.to_string()))
                }
            })
            .collect::<Result<SmallVec<_>, _>>()
            .map(Self)
    }
}

impl From<&[usize]> for NodePath {
    fn from(segments: &[usize]) -> Self {
        Self(segments.iter().copied().collect())
    }
}

/// Errors related to node paths
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// Empty segment in path
    #[error("path contains empty segment")]
    EmptySegment,

    /// Segment is not a child index
    #[error("invalid segment: {0} (must be a child index)")]
    InvalidSegment(String),

    /// Path text does not start at the root
    #[error("path '{0}' must start with '/'")]
    NotAbsolute(String),

    /// Not a descendant path
    #[error("path '{path}' is not a descendant of '{ancestor}'")]
    NotDescendant {
        /// The path being relativized
        path: String,
        /// The expected ancestor
        ancestor: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> NodePath {
        s.parse().unwrap()
    }

    #[test]
    fn display_and_parse() {
        assert_eq!(NodePath::root().to_string(), "/");
        assert_eq!(p("/0/3").segments(), &[0, 3]);
        assert_eq!(p("/0/3").to_string(), "/0/3");
        assert!(p("/").is_root());
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!("0/1".parse::<NodePath>(), Err(PathError::NotAbsolute(_))));
        assert!(matches!("/0//1".parse::<NodePath>(), Err(PathError::EmptySegment)));
        assert!(matches!("/a".parse::<NodePath>(), Err(PathError::InvalidSegment(_))));
    }

    #[test]
    fn parent_and_child() {
        let path = p("/1/2");
        assert_eq!(path.parent(), Some(p("/1")));
        assert_eq!(path.last(), Some(2));
        assert_eq!(p("/1").child(2), path);
        assert_eq!(NodePath::root().parent(), None);
    }

    #[test]
    fn prefix_relations() {
        assert!(p("/1").is_prefix_of(&p("/1/2")));
        assert!(p("/1").is_ancestor_of(&p("/1/2")));
        assert!(!p("/1").is_ancestor_of(&p("/1")));
        assert!(p("/1/2").overlaps(&p("/1")));
        assert!(!p("/1/2").overlaps(&p("/2")));
        assert_eq!(p("/1/2/3").relative_to(&p("/1")).unwrap(), p("/2/3"));
        assert!(p("/2").relative_to(&p("/1")).is_err());
    }

    #[test]
    fn rebase_shifts_following_siblings() {
        let inserted = p("/1/2");
        assert_eq!(p("/1/2").rebase_after_insert(&inserted, 2), p("/1/4"));
        assert_eq!(p("/1/5/0").rebase_after_insert(&inserted, 2), p("/1/7/0"));
        assert_eq!(p("/1/1").rebase_after_insert(&inserted, 2), p("/1/1"));
        assert_eq!(p("/2/3").rebase_after_insert(&inserted, 2), p("/2/3"));
    }

    proptest::proptest! {
        #[test]
        fn insert_then_remove_restores_path(
            path in proptest::collection::vec(0usize..6, 1..5),
            at in proptest::collection::vec(0usize..6, 1..4),
            count in 1usize..4,
        ) {
            let path = NodePath::new(path);
            let at = NodePath::new(at);
            let shifted = path.rebase_after_insert(&at, count);
            proptest::prop_assert_eq!(shifted.rebase_after_remove(&at, count), Some(path));
        }
    }

    #[test]
    fn rebase_after_remove_drops_removed_range() {
        let removed = p("/1/2");
        assert_eq!(p("/1/2/0").rebase_after_remove(&removed, 2), None);
        assert_eq!(p("/1/3").rebase_after_remove(&removed, 2), None);
        assert_eq!(p("/1/4").rebase_after_remove(&removed, 2), Some(p("/1/2")));
        assert_eq!(p("/1/1").rebase_after_remove(&removed, 2), Some(p("/1/1")));
    }
}
