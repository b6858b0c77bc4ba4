//! Appearance equipment handler.

use std::collections::BTreeMap;
use std::sync::Mutex;

use tether_types::{EquipSlot, GearPiece};

use super::ApplyGate;
use crate::apply::GearApplier;
use crate::domains::{GearFinal, GearResolver, LayerCache};
use crate::keys::CacheKey;

pub struct GearHandler {
    cache: Mutex<LayerCache<GearResolver>>,
    /// Last final value the subsystem accepted; diffed against the next
    /// resolved value so only touched slots generate external calls.
    last_applied: Mutex<GearFinal>,
    applier: Box<dyn GearApplier>,
    gate: ApplyGate,
}

impl GearHandler {
    pub fn new(applier: Box<dyn GearApplier>) -> Self {
        Self {
            cache: Mutex::new(LayerCache::new(GearResolver)),
            last_applied: Mutex::new(BTreeMap::new()),
            applier,
            gate: ApplyGate::new(),
        }
    }

    pub fn try_add(&self, key: CacheKey, payload: BTreeMap<EquipSlot, GearPiece>) -> bool {
        self.cache.lock().unwrap().try_add(key, payload)
    }

    pub fn try_remove(&self, key: &CacheKey) -> bool {
        self.cache.lock().unwrap().try_remove(key)
    }

    /// Recompute the final value; push the difference to the appearance
    /// subsystem if it changed.
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

    /// Empty the cache, then restore every previously-overridden slot.
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

    /// Anti-tamper: the appearance subsystem reported an external change.
    /// Ignored while our own application is in flight; otherwise any
    /// restricted slot that diverges from the resolved value is re-issued.
    pub async fn reconcile(&self) {
        if self.gate.in_flight() {
            tracing::trace!("[GEAR] change notification ignored (apply in flight)");
            return;
        }

        let resolved = self.resolved();
        if resolved.is_empty() {
            return;
        }

        let observed = match self.applier.current_equipment().await {
            Ok(equipment) => equipment,
            Err(err) => {
                tracing::error!("[GEAR] reconcile read-back failed: {err}");
                return;
            }
        };

        let mut divergent: Vec<(EquipSlot, GearPiece)> = Vec::new();
        for (&slot, &piece) in &resolved {
            if observed.get(&slot) != Some(&piece) {
                divergent.push((slot, piece));
            }
        }
        if divergent.is_empty() {
            return;
        }

        tracing::info!("[GEAR] reconciling {} tampered slot(s)", divergent.len());
        let _permit = self.gate.acquire().await;
        for (slot, piece) in divergent {
            if let Err(err) = self.applier.set_slot(slot, piece).await {
                tracing::error!("[GEAR] reconcile of {slot} failed: {err}");
            }
        }
        self.gate.release_deferred().await;
    }

    /// Diff `target` against the last applied state and issue the calls.
    /// Commits `last_applied` only when every call succeeded, so a failed
    /// application is retried wholesale on the next update.
    async fn apply_target(&self, target: GearFinal) -> bool {
        let previous = self.last_applied.lock().unwrap().clone();
        if target == previous {
            return false;
        }

        let mut ok = true;
        for slot in previous.keys() {
            if !target.contains_key(slot) {
                if let Err(err) = self.applier.restore_slot(*slot).await {
                    tracing::error!("[GEAR] restore of {slot} failed: {err}");
                    ok = false;
                }
            }
        }
        for (&slot, &piece) in &target {
            if previous.get(&slot) != Some(&piece) {
                if let Err(err) = self.applier.set_slot(slot, piece).await {
                    tracing::error!("[GEAR] set of {slot} failed: {err}");
                    ok = false;
                }
            }
        }

        if ok {
            *self.last_applied.lock().unwrap() = target;
        }
        ok
    }

    pub fn resolved(&self) -> GearFinal {
        self.cache.lock().unwrap().final_value().clone()
    }

    pub fn entry_count(&self) -> usize {
        self.cache.lock().unwrap().len()
    }
}
