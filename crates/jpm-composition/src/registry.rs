//! Strategy registry for composition strategies
//!
//! Provides [`StrategyRegistry`] for looking strategies up by the name used
//! in [`ComposerConfig`](crate::ComposerConfig).

use crate::ordered::OrderedCompositionStrategy;
use crate::single_writer::SingleWriterStrategy;
use crate::strategy::{CompositionError, CompositionStrategy};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Registry of available composition strategies
#[derive(Debug, Default, Clone)]
pub struct StrategyRegistry {
    strategies: BTreeMap<String, Arc<dyn CompositionStrategy>>,
}

impl StrategyRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create registry with built-in strategies
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(SingleWriterStrategy::new()));
        registry.register(Arc::new(OrderedCompositionStrategy::new()));
        registry
    }

    /// Register a strategy under its own name
    pub fn register(&mut self, strategy: Arc<dyn CompositionStrategy>) {
        self.strategies.insert(strategy.name().to_string(), strategy);
    }

    /// Check if strategy exists
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    /// Look a strategy up by name
    ///
    /// # Errors
    /// Returns [`CompositionError::UnknownStrategy`] listing registered names.
    pub fn get(&self, name: &str) -> Result<Arc<dyn CompositionStrategy>, CompositionError> {
        self.strategies
            .get(name)
            .cloned()
            .ok_or_else(|| CompositionError::UnknownStrategy {
                name: name.to_string(),
                available: self.names().join(", "),
            })
    }

    /// Remove strategy
    #[inline]
    pub fn remove(&mut self, name: &str) -> bool {
        self.strategies.remove(name).is_some()
    }

    /// Registered strategy names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.strategies.keys().map(String::as_str).collect()
    }

    /// Get number of registered strategies
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

/// Strategy selection hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategyHint {
    /// Surface every contested value (use `single_writer`) - default
    #[default]
    Safety,

    /// Trust the declared recipe order (use `ordered`)
    Ordered,
}

impl StrategyHint {
    /// Registry name of the strategy for this hint
    #[must_use]
    pub fn strategy_name(self) -> &'static str {
        match self {
            Self::Safety => "single_writer",
            Self::Ordered => "ordered",
        }
    }
}
