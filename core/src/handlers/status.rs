//! Timed-status handler.

use std::collections::BTreeSet;
use std::sync::Mutex;

use tether_types::StatusId;

use super::ApplyGate;
use crate::apply::StatusApplier;
use crate::domains::{LayerCache, StatusResolver};
use crate::keys::CacheKey;

pub struct StatusHandler {
    cache: Mutex<LayerCache<StatusResolver>>,
    last_applied: Mutex<BTreeSet<StatusId>>,
    applier: Box<dyn StatusApplier>,
    gate: ApplyGate,
}

impl StatusHandler {
    pub fn new(applier: Box<dyn StatusApplier>) -> Self {
        Self {
            cache: Mutex::new(LayerCache::new(StatusResolver)),
            last_applied: Mutex::new(BTreeSet::new()),
            applier,
            gate: ApplyGate::new(),
        }
    }

    pub fn try_add(&self, key: CacheKey, payload: BTreeSet<StatusId>) -> bool {
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

    /// Anti-tamper: a status was removed (or added) outside the engine.
    /// Any resolved status missing from the subsystem's active set is
    /// re-applied.
    pub async fn reconcile(&self) {
        if self.gate.in_flight() {
            tracing::trace!("[STATUS] change notification ignored (apply in flight)");
            return;
        }

        let resolved = self.resolved();
        if resolved.is_empty() {
            return;
        }

        let observed = match self.applier.active().await {
            Ok(active) => active,
            Err(err) => {
                tracing::error!("[STATUS] reconcile read-back failed: {err}");
                return;
            }
        };

        let missing: Vec<StatusId> = resolved.difference(&observed).copied().collect();
        if missing.is_empty() {
            return;
        }

        tracing::info!("[STATUS] reconciling {} missing status(es)", missing.len());
        let _permit = self.gate.acquire().await;
        if let Err(err) = self.applier.apply(&missing).await {
            tracing::error!("[STATUS] reconcile apply failed: {err}");
        }
        self.gate.release_deferred().await;
    }

    async fn apply_target(&self, target: BTreeSet<StatusId>) -> bool {
        let previous = self.last_applied.lock().unwrap().clone();
        if target == previous {
            return false;
        }

        let to_add: Vec<StatusId> = target.difference(&previous).copied().collect();
        let to_remove: Vec<StatusId> = previous.difference(&target).copied().collect();

        let mut ok = true;
        if !to_remove.is_empty() {
            if let Err(err) = self.applier.remove(&to_remove).await {
                tracing::error!("[STATUS] remove failed: {err}");
                ok = false;
            }
        }
        if !to_add.is_empty() {
            if let Err(err) = self.applier.apply(&to_add).await {
                tracing::error!("[STATUS] apply failed: {err}");
                ok = false;
            }
        }

        if ok {
            *self.last_applied.lock().unwrap() = target;
        }
        ok
    }

    pub fn resolved(&self) -> BTreeSet<StatusId> {
        self.cache.lock().unwrap().final_value().clone()
    }

    pub fn entry_count(&self) -> usize {
        self.cache.lock().unwrap().len()
    }
}
