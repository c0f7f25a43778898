//! Dependency graph lookups
//!
//! Resolving what a dependency pulls in transitively needs repository
//! access, which the engine does not have. [`DependencyResolver`] is the
//! seam where a caller plugs that knowledge in; [`StaticResolver`] serves it
//! from a precomputed graph.

use crate::coordinate::Coordinate;
use indexmap::IndexSet;
use std::collections::{HashMap, VecDeque};

/// Source of direct dependency edges between coordinates
pub trait DependencyResolver: Send + Sync {
    /// Direct dependencies of `coordinate`
    fn dependencies_of(&self, coordinate: &Coordinate) -> Vec<Coordinate>;

    /// All coordinates reachable from `coordinate`, excluding itself,
    /// in breadth-first order
    fn transitive(&self, coordinate: &Coordinate) -> IndexSet<Coordinate> {
        let mut seen = IndexSet::new();
        let mut queue: VecDeque<Coordinate> = self.dependencies_of(coordinate).into();
        while let Some(next) = queue.pop_front() {
            if next == *coordinate || !seen.insert(next.clone()) {
                continue;
            }
            queue.extend(self.dependencies_of(&next));
        }
        seen
    }
}

/// Resolver that knows nothing: every dependency is a leaf
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResolver;

impl DependencyResolver for NoResolver {
    fn dependencies_of(&self, _: &Coordinate) -> Vec<Coordinate> {
        Vec::new()
    }
}

/// Resolver backed by an in-memory edge list
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    edges: HashMap<Coordinate, Vec<Coordinate>>,
}

impl StaticResolver {
    /// Empty graph
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add edges from `from` to each of `to`
    #[must_use]
    pub fn with(mut self, from: Coordinate, to: impl IntoIterator<Item = Coordinate>) -> Self {
        self.edges.entry(from).or_default().extend(to);
        self
    }

    /// Number of coordinates with outgoing edges
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph has no edges
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

impl DependencyResolver for StaticResolver {
    fn dependencies_of(&self, coordinate: &Coordinate) -> Vec<Coordinate> {
        self.edges.get(coordinate).cloned().unwrap_or_default()
    }
}
