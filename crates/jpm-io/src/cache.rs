//! Content-addressed parse cache using moka
//!
//! Parsed documents are stored by the hash of the text they came from, so
//! identical files (and re-loads of an unchanged project) parse once.

use jpm_tree::{ContentHash, Document, DocumentKind};
use moka::sync::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Statistics for cache performance monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of entries in cache
    pub entry_count: u64,
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that had to parse
    pub misses: u64,
}

/// Cache key: the same text parses differently as XML or as plain text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    hash: ContentHash,
    kind: DocumentKind,
}

impl CacheKey {
    /// Key for `content` parsed as `kind`
    #[inline]
    #[must_use]
    pub fn new(kind: DocumentKind, content: &str) -> Self {
        Self {
            hash: ContentHash::of_text(content),
            kind,
        }
    }

    /// Get content hash
    #[inline]
    #[must_use]
    pub fn hash(&self) -> &ContentHash {
        &self.hash
    }

    /// Get document kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> DocumentKind {
        self.kind
    }
}

/// Content-addressed document cache
///
/// Cloning is cheap and clones share entries and counters.
#[derive(Debug, Clone)]
pub struct ParseCache {
    inner: Cache<CacheKey, Document>,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl ParseCache {
    /// Create new cache with max capacity
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self::from_cache(Cache::new(max_capacity))
    }

    /// Create cache with time-based expiration
    #[inline]
    #[must_use]
    pub fn with_ttl(max_capacity: u64, ttl: Duration) -> Self {
        Self::from_cache(Cache::builder().max_capacity(max_capacity).time_to_live(ttl).build())
    }

    fn from_cache(inner: Cache<CacheKey, Document>) -> Self {
        Self {
            inner,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Get document from cache
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<Document> {
        let found = self.inner.get(key);
        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Insert document into cache
    #[inline]
    pub fn insert(&self, key: CacheKey, document: Document) {
        self.inner.insert(key, document);
    }

    /// Get or parse
    ///
    /// # Errors
    /// Whatever `parse` returns; failures are not cached.
    pub fn try_get_or_insert_with<E, F>(&self, key: CacheKey, parse: F) -> Result<Document, E>
    where
        F: FnOnce() -> Result<Document, E>,
    {
        if let Some(cached) = self.get(&key) {
            return Ok(cached);
        }
        let document = parse()?;
        tracing::trace!(hash = %key.hash.short(), kind = ?key.kind, "parse cached");
        self.insert(key, document.clone());
        Ok(document)
    }

    /// Check if cache contains key
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.inner.contains_key(key)
    }

    /// Invalidate all entries
    #[inline]
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Get cache statistics
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.inner.run_pending_tasks();
        CacheStats {
            entry_count: self.inner.entry_count(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for ParseCache {
    /// Create cache with default capacity (10,000 entries)
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jpm_tree::TextDocument;

    fn text(content: &str) -> Document {
        TextDocument::new(content).into()
    }

    #[test]
    fn cache_insert_and_get() {
        let cache = ParseCache::new(100);
        let key = CacheKey::new(DocumentKind::Text, "hello");
        cache.insert(key, text("hello"));
        assert_eq!(cache.get(&key), Some(text("hello")));
        assert!(cache.contains(&key));
    }

    #[test]
    fn kind_is_part_of_the_key() {
        let cache = ParseCache::new(100);
        cache.insert(CacheKey::new(DocumentKind::Text, "<a/>"), text("<a/>"));
        assert!(cache.get(&CacheKey::new(DocumentKind::Xml, "<a/>")).is_none());
    }

    #[test]
    fn parses_once() {
        let cache = ParseCache::new(100);
        let key = CacheKey::new(DocumentKind::Text, "compute me");
        let calls = AtomicU64::new(0);
        let parse = || -> Result<Document, String> {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(text("compute me"))
        };
        cache.try_get_or_insert_with(key, parse).unwrap();
        cache.try_get_or_insert_with(key, parse).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.entry_count), (1, 1, 1));
    }

    #[test]
    fn failures_are_not_cached() {
        let cache = ParseCache::new(100);
        let key = CacheKey::new(DocumentKind::Xml, "<a>");
        let failed: Result<Document, &str> = cache.try_get_or_insert_with(key, || Err("broken"));
        assert!(failed.is_err());
        assert!(!cache.contains(&key));
    }

    #[test]
    fn invalidation() {
        let cache = ParseCache::default();
        let key = CacheKey::new(DocumentKind::Text, "x");
        cache.insert(key, text("x"));
        cache.invalidate_all();
        assert!(cache.get(&key).is_none());
    }
}
