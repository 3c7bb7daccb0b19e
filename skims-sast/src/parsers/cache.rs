//! Parse cache keyed by content hash, backed by moka.
//!
//! Identical files (vendored copies, generated code) are parsed once per
//! run. Cached results share their raw tree through an `Arc`.

use std::sync::atomic::{AtomicU64, Ordering};

use moka::sync::Cache;

use super::types::ParseResult;
use crate::scanner::language_detect::Language;

/// xxh3 hash of file content.
pub fn hash_content(content: &[u8]) -> u64 {
    xxhash_rust::xxh3::xxh3_64(content)
}

/// Content hash, language and grammar variant (TSX vs TS).
type CacheKey = (u64, Language, bool);

/// Bounded TinyLFU cache of parse results.
pub struct ParseCache {
    cache: Cache<CacheKey, ParseResult>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ParseCache {
    pub fn new(capacity: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(capacity).build(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up a cached result, re-labelled with `file`.
    pub fn get(&self, key: CacheKey, file: &str) -> Option<ParseResult> {
        match self.cache.get(&key) {
            Some(mut result) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                result.file = file.to_string();
                Some(result)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn insert(&self, key: CacheKey, result: ParseResult) {
        self.cache.insert(key, result);
    }

    /// Hits over lookups, 0.0 before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let total = hits + self.misses.load(Ordering::Relaxed);
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_content_addressed() {
        assert_eq!(hash_content(b"class A {}"), hash_content(b"class A {}"));
        assert_ne!(hash_content(b"class A {}"), hash_content(b"class B {}"));
    }

    #[test]
    fn hit_rate_starts_at_zero() {
        let cache = ParseCache::new(16);
        assert_eq!(cache.hit_rate(), 0.0);
        assert!(cache.get((1, Language::Java, false), "A.java").is_none());
        assert_eq!(cache.hit_rate(), 0.0);
    }
}
