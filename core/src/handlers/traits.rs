//! Trait-flag handler.
//!
//! Pure in-process domain: the resolved flag union is read by the
//! gameplay-restriction evaluator, nothing is pushed externally, so there
//! is no applier and no guard.

use std::sync::Mutex;

use tether_types::TraitFlags;

use crate::domains::{LayerCache, TraitResolver};
use crate::keys::CacheKey;

pub struct TraitHandler {
    cache: Mutex<LayerCache<TraitResolver>>,
}

impl Default for TraitHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl TraitHandler {
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(LayerCache::new(TraitResolver)),
        }
    }

    pub fn try_add(&self, key: CacheKey, payload: TraitFlags) -> bool {
        self.cache.lock().unwrap().try_add(key, payload)
    }

    pub fn try_remove(&self, key: &CacheKey) -> bool {
        self.cache.lock().unwrap().try_remove(key)
    }

    /// Recompute the union; returns whether it changed.
    pub fn update(&self) -> bool {
        self.cache.lock().unwrap().recompute_final()
    }

    pub fn clear_and_apply(&self) {
        let mut cache = self.cache.lock().unwrap();
        cache.clear();
        cache.recompute_final();
    }

    /// The active restriction traits, for the gameplay evaluator.
    pub fn current(&self) -> TraitFlags {
        *self.cache.lock().unwrap().final_value()
    }

    pub fn entry_count(&self) -> usize {
        self.cache.lock().unwrap().len()
    }
}
