//! Span resolution memo
//!
//! Owned by one [`NameResolver`](super::NameResolver) and keyed by the span
//! exactly as passed in. Entries are pure functions of the key and the
//! roster, so concurrent writers racing on the same key store the same value
//! and insert-or-ignore is all the coordination needed.
//!
//! The cache is bounded: once `capacity` entries exist, new results are
//! returned but not stored. `clear()` starts over, e.g. between runs against
//! a different roster.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use super::ResolvedName;

/// Hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

#[derive(Debug)]
pub struct ResolutionCache {
    entries: RwLock<HashMap<String, Option<ResolvedName>>>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResolutionCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Memoized outcome for `span`; the inner `None` is a remembered failure
    pub fn get(&self, span: &str) -> Option<Option<ResolvedName>> {
        // A panic elsewhere cannot leave a half-written entry; ignore poisoning
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let found = entries.get(span).cloned();
        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Store `outcome` unless the key is present or the cache is full
    pub fn insert(&self, span: &str, outcome: Option<ResolvedName>) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.len() >= self.capacity || entries.contains_key(span) {
            return;
        }
        entries.insert(span.to_string(), outcome);
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{MatchStrategy, NameMatch};

    fn single(name: &str) -> Option<ResolvedName> {
        Some(ResolvedName::Single(NameMatch {
            name: name.to_string(),
            confidence: 100.0,
            strategy: MatchStrategy::Exact,
        }))
    }

    #[test]
    fn test_get_distinguishes_miss_from_remembered_failure() {
        let cache = ResolutionCache::new(8);
        assert_eq!(cache.get("ZZZ"), None);

        cache.insert("ZZZ", None);
        assert_eq!(cache.get("ZZZ"), Some(None));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_insert_or_ignore() {
        let cache = ResolutionCache::new(8);
        cache.insert("MA", single("MA LONG"));
        cache.insert("MA", single("MA LIN"));
        assert_eq!(cache.get("MA"), Some(single("MA LONG")));
    }

    #[test]
    fn test_capacity_bound_and_clear() {
        let cache = ResolutionCache::new(2);
        cache.insert("A", None);
        cache.insert("B", None);
        cache.insert("C", None);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("C"), None);

        cache.clear();
        assert!(cache.is_empty());
    }
}
