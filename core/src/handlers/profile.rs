//! Cosmetic-profile handler.

use std::sync::Mutex;

use tether_types::ProfileRef;

use super::ApplyGate;
use crate::apply::ProfileApplier;
use crate::domains::{LayerCache, ProfileResolver};
use crate::keys::CacheKey;

pub struct ProfileHandler {
    cache: Mutex<LayerCache<ProfileResolver>>,
    last_applied: Mutex<Option<ProfileRef>>,
    applier: Box<dyn ProfileApplier>,
    gate: ApplyGate,
}

impl ProfileHandler {
    pub fn new(applier: Box<dyn ProfileApplier>) -> Self {
        Self {
            cache: Mutex::new(LayerCache::new(ProfileResolver)),
            last_applied: Mutex::new(None),
            applier,
            gate: ApplyGate::new(),
        }
    }

    pub fn try_add(&self, key: CacheKey, payload: ProfileRef) -> bool {
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

    /// Anti-tamper: the profile plugin reported a profile switch. The
    /// notification carries the now-active profile; if the engine holds a
    /// profile and it is not the observed one, it is re-enabled.
    pub async fn reconcile(&self, observed: Option<&ProfileRef>) {
        if self.gate.in_flight() {
            tracing::trace!("[PROFILE] change notification ignored (apply in flight)");
            return;
        }

        let Some(resolved) = self.resolved() else {
            return;
        };
        if observed == Some(&resolved) {
            return;
        }

        tracing::info!("[PROFILE] reconciling forced profile {resolved}");
        let _permit = self.gate.acquire().await;
        if let Err(err) = self.applier.enable(&resolved).await {
            tracing::error!("[PROFILE] reconcile enable failed: {err}");
        }
        self.gate.release_deferred().await;
    }

    async fn apply_target(&self, target: Option<ProfileRef>) -> bool {
        let previous = self.last_applied.lock().unwrap().clone();
        if target == previous {
            return false;
        }

        let result = match &target {
            Some(profile) => self.applier.enable(profile).await,
            None => self.applier.disable().await,
        };

        match result {
            Ok(()) => {
                *self.last_applied.lock().unwrap() = target;
                true
            }
            Err(err) => {
                tracing::error!("[PROFILE] apply failed: {err}");
                false
            }
        }
    }

    pub fn resolved(&self) -> Option<ProfileRef> {
        self.cache.lock().unwrap().final_value().clone()
    }

    pub fn entry_count(&self) -> usize {
        self.cache.lock().unwrap().len()
    }
}
