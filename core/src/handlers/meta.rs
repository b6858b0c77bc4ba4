//! Appearance meta-flag handler.

use std::collections::BTreeMap;
use std::sync::Mutex;

use tether_types::MetaFlag;

use super::ApplyGate;
use crate::apply::MetaApplier;
use crate::domains::{LayerCache, MetaFinal, MetaResolver};
use crate::keys::CacheKey;

pub struct MetaHandler {
    cache: Mutex<LayerCache<MetaResolver>>,
    last_applied: Mutex<MetaFinal>,
    applier: Box<dyn MetaApplier>,
    gate: ApplyGate,
}

impl MetaHandler {
    pub fn new(applier: Box<dyn MetaApplier>) -> Self {
        Self {
            cache: Mutex::new(LayerCache::new(MetaResolver)),
            last_applied: Mutex::new(BTreeMap::new()),
            applier,
            gate: ApplyGate::new(),
        }
    }

    pub fn try_add(&self, key: CacheKey, payload: BTreeMap<MetaFlag, bool>) -> bool {
        self.cache.lock().unwrap().try_add(key, payload)
    }

    pub fn try_remove(&self, key: &CacheKey) -> bool {
        self.cache.lock().unwrap().try_remove(key)
    }

    pub async fn update(&self) -> bool {
        let _permit = self.gate.acquire().await;
        let target = {
            let mut cache = self.cache.lock().unwrap();
            cache.recompute_final();
            cache.final_value().clone()
        };
        let applied = self.apply_target(target).await;
        self.gate.release_deferred().await;
        applied
    }

    pub async fn clear_and_apply(&self) {
        let _permit = self.gate.acquire().await;
        let target = {
            let mut cache = self.cache.lock().unwrap();
            cache.clear();
            cache.recompute_final();
            cache.final_value().clone()
        };
        self.apply_target(target).await;
        self.gate.release_deferred().await;
    }

    /// Flags the resolved value no longer mentions are unset; changed or
    /// newly-defined flags are written explicitly.
    async fn apply_target(&self, target: MetaFinal) -> bool {
        let previous = self.last_applied.lock().unwrap().clone();
        if target == previous {
            return false;
        }

        let mut ok = true;
        for flag in previous.keys() {
            if !target.contains_key(flag) {
                if let Err(err) = self.applier.set_flag(*flag, None).await {
                    tracing::error!("[META] unset of {flag} failed: {err}");
                    ok = false;
                }
            }
        }
        for (&flag, &state) in &target {
            if previous.get(&flag) != Some(&state) {
                if let Err(err) = self.applier.set_flag(flag, Some(state)).await {
                    tracing::error!("[META] set of {flag} failed: {err}");
                    ok = false;
                }
            }
        }

        if ok {
            *self.last_applied.lock().unwrap() = target;
        }
        ok
    }

    pub fn resolved(&self) -> MetaFinal {
        self.cache.lock().unwrap().final_value().clone()
    }

    pub fn entry_count(&self) -> usize {
        self.cache.lock().unwrap().len()
    }
}
