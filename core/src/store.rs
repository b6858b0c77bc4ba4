//! Ordered contribution storage shared by every domain cache.

use std::collections::BTreeMap;

use crate::keys::CacheKey;

/// All current contributions for one domain, kept sorted by key.
///
/// Pure storage: resolution rules live in the domain resolvers.
#[derive(Debug, Clone, Default)]
pub struct Contributions<P> {
    entries: BTreeMap<CacheKey, P>,
}

impl<P> Contributions<P> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Store a payload under `key`. Re-adding an existing key is rejected
    /// (logged, no-op) rather than silently overwritten.
    pub fn add(&mut self, key: CacheKey, payload: P) -> bool {
        if self.entries.contains_key(&key) {
            tracing::warn!("[CACHE] duplicate key rejected: {key}");
            return false;
        }
        self.entries.insert(key, payload);
        true
    }

    /// Remove the entry at `key`, returning its payload if present.
    /// A missing key is logged and leaves the store untouched.
    pub fn remove(&mut self, key: &CacheKey) -> Option<P> {
        let removed = self.entries.remove(key);
        if removed.is_none() {
            tracing::warn!("[CACHE] remove of missing key: {key}");
        }
        removed
    }

    /// Remove several keys at once, returning the payloads that existed.
    pub fn remove_many<'a>(&mut self, keys: impl IntoIterator<Item = &'a CacheKey>) -> Vec<P> {
        keys.into_iter().filter_map(|k| self.remove(k)).collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries in ascending key order (lowest key first).
    pub fn iter(&self) -> impl Iterator<Item = (&CacheKey, &P)> {
        self.entries.iter()
    }

    /// The entry with the lowest key, if any.
    pub fn first(&self) -> Option<(&CacheKey, &P)> {
        self.entries.first_key_value()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
