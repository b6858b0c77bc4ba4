//! Mod-preset handler.

use std::collections::BTreeMap;
use std::sync::Mutex;

use tether_types::{ModIdentity, PresetPayload};

use super::ApplyGate;
use crate::apply::PresetApplier;
use crate::domains::{LayerCache, PresetFinal, PresetResolver};
use crate::keys::CacheKey;

pub struct PresetHandler {
    cache: Mutex<LayerCache<PresetResolver>>,
    last_applied: Mutex<PresetFinal>,
    applier: Box<dyn PresetApplier>,
    gate: ApplyGate,
}

impl PresetHandler {
    pub fn new(applier: Box<dyn PresetApplier>) -> Self {
        Self {
            cache: Mutex::new(LayerCache::new(PresetResolver)),
            last_applied: Mutex::new(BTreeMap::new()),
            applier,
            gate: ApplyGate::new(),
        }
    }

    pub fn try_add(&self, key: CacheKey, payload: BTreeMap<ModIdentity, PresetPayload>) -> bool {
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

    /// Upsert new/changed overrides, remove vanished ones. The mod manager
    /// answers with status codes; anything but success is logged and the
    /// whole target is retried on the next update.
    async fn apply_target(&self, target: PresetFinal) -> bool {
        let previous = self.last_applied.lock().unwrap().clone();
        if target == previous {
            return false;
        }

        let mut ok = true;
        for id in previous.keys() {
            if !target.contains_key(id) {
                let status = self.applier.remove(id).await;
                if !status.is_success() {
                    tracing::error!("[PRESET] remove of {id} failed: {status:?}");
                    ok = false;
                }
            }
        }
        for (id, payload) in &target {
            if previous.get(id) != Some(payload) {
                let status = self.applier.upsert(id, payload).await;
                if !status.is_success() {
                    tracing::error!("[PRESET] upsert of {id} failed: {status:?}");
                    ok = false;
                }
            }
        }

        if ok {
            *self.last_applied.lock().unwrap() = target;
        }
        ok
    }

    pub fn resolved(&self) -> PresetFinal {
        self.cache.lock().unwrap().final_value().clone()
    }

    pub fn entry_count(&self) -> usize {
        self.cache.lock().unwrap().len()
    }
}
