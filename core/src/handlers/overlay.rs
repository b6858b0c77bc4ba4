//! Screen-overlay handler.

use std::sync::Mutex;

use tether_types::{OverlayDescriptor, OverlayKind};

use super::ApplyGate;
use crate::apply::OverlayApplier;
use crate::domains::{LayerCache, OverlayResolver};
use crate::keys::CacheKey;

pub struct OverlayHandler {
    cache: Mutex<LayerCache<OverlayResolver>>,
    last_applied: Mutex<Option<OverlayDescriptor>>,
    applier: Box<dyn OverlayApplier>,
    gate: ApplyGate,
}

impl OverlayHandler {
    pub fn new(applier: Box<dyn OverlayApplier>, preference: OverlayKind) -> Self {
        Self {
            cache: Mutex::new(LayerCache::new(OverlayResolver::new(preference))),
            last_applied: Mutex::new(None),
            applier,
            gate: ApplyGate::new(),
        }
    }

    pub fn try_add(&self, key: CacheKey, payload: Vec<OverlayDescriptor>) -> bool {
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

    /// Anti-tamper: the overlay renderer reported its state changed. If an
    /// overlay is resolved and the observed one differs, it is re-issued.
    pub async fn reconcile(&self, observed: Option<&OverlayDescriptor>) {
        if self.gate.in_flight() {
            tracing::trace!("[OVERLAY] change notification ignored (apply in flight)");
            return;
        }

        let Some(resolved) = self.resolved() else {
            return;
        };
        if observed == Some(&resolved) {
            return;
        }

        tracing::info!("[OVERLAY] reconciling forced {resolved}");
        let _permit = self.gate.acquire().await;
        if let Err(err) = self.applier.set(&resolved).await {
            tracing::error!("[OVERLAY] reconcile set failed: {err}");
        }
        self.gate.release_deferred().await;
    }

    async fn apply_target(&self, target: Option<OverlayDescriptor>) -> bool {
        let previous = self.last_applied.lock().unwrap().clone();
        if target == previous {
            return false;
        }

        let result = match &target {
            Some(overlay) => self.applier.set(overlay).await,
            None => self.applier.clear().await,
        };

        match result {
            Ok(()) => {
                *self.last_applied.lock().unwrap() = target;
                true
            }
            Err(err) => {
                tracing::error!("[OVERLAY] apply failed: {err}");
                false
            }
        }
    }

    pub fn resolved(&self) -> Option<OverlayDescriptor> {
        self.cache.lock().unwrap().final_value().clone()
    }

    pub fn entry_count(&self) -> usize {
        self.cache.lock().unwrap().len()
    }
}
