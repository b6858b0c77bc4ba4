//! Tests for domain handler guard discipline and external application.
//!
//! Uses probe appliers that count calls, block mid-apply, or fail on
//! demand, standing in for the external presentation subsystems.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use tether_types::{ContributorId, EquipSlot, GearPiece, ProfileId, ProfileRef, StatusId};

use super::*;
use crate::apply::{
    ApplyError, DryRunGear, DryRunStatus, GearApplier, ProfileApplier, StatusApplier,
};
use crate::keys::CacheKey;

fn key(priority: u8, layer: i8) -> CacheKey {
    CacheKey::new(priority, layer, ContributorId::new("tester"), "item")
}

fn head_payload(item: u64) -> BTreeMap<EquipSlot, GearPiece> {
    BTreeMap::from([(EquipSlot::Head, GearPiece::new(item))])
}

// ─────────────────────────────────────────────────────────────────────────────
// Probe appliers
// ─────────────────────────────────────────────────────────────────────────────

/// Counts gear calls on top of the dry-run state.
#[derive(Default)]
struct CountingGear {
    inner: DryRunGear,
    set_calls: AtomicUsize,
    restore_calls: AtomicUsize,
}

#[async_trait]
impl GearApplier for Arc<CountingGear> {
    async fn set_slot(&self, slot: EquipSlot, piece: GearPiece) -> Result<(), ApplyError> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.set_slot(slot, piece).await
    }

    async fn restore_slot(&self, slot: EquipSlot) -> Result<(), ApplyError> {
        self.restore_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.restore_slot(slot).await
    }

    async fn current_equipment(&self) -> Result<BTreeMap<EquipSlot, GearPiece>, ApplyError> {
        self.inner.current_equipment().await
    }
}

/// Blocks inside `set_slot` until released, so a test can observe the
/// guard window from outside.
#[derive(Default)]
struct BlockingGear {
    entered: Notify,
    release: Notify,
    set_calls: AtomicUsize,
}

#[async_trait]
impl GearApplier for Arc<BlockingGear> {
    async fn set_slot(&self, _slot: EquipSlot, _piece: GearPiece) -> Result<(), ApplyError> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        self.release.notified().await;
        Ok(())
    }

    async fn restore_slot(&self, _slot: EquipSlot) -> Result<(), ApplyError> {
        Ok(())
    }

    async fn current_equipment(&self) -> Result<BTreeMap<EquipSlot, GearPiece>, ApplyError> {
        // Reports an empty character so every resolved slot looks tampered.
        Ok(BTreeMap::new())
    }
}

/// Fails every call until `healthy` is flipped.
#[derive(Default)]
struct FlakyProfile {
    healthy: AtomicBool,
    enable_calls: AtomicUsize,
}

#[async_trait]
impl ProfileApplier for Arc<FlakyProfile> {
    async fn enable(&self, _profile: &ProfileRef) -> Result<(), ApplyError> {
        self.enable_calls.fetch_add(1, Ordering::SeqCst);
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ApplyError::Unavailable("plugin not ready".into()))
        }
    }

    async fn disable(&self) -> Result<(), ApplyError> {
        Ok(())
    }
}

/// Counts status batches on top of the dry-run state.
#[derive(Default)]
struct CountingStatus {
    inner: DryRunStatus,
    apply_calls: AtomicUsize,
}

#[async_trait]
impl StatusApplier for Arc<CountingStatus> {
    async fn apply(&self, add: &[StatusId]) -> Result<(), ApplyError> {
        self.apply_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.apply(add).await
    }

    async fn remove(&self, remove: &[StatusId]) -> Result<(), ApplyError> {
        self.inner.remove(remove).await
    }

    async fn active(&self) -> Result<std::collections::BTreeSet<StatusId>, ApplyError> {
        self.inner.active().await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Update / idempotence
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_without_change_issues_no_external_call() {
    let probe = Arc::new(CountingGear::default());
    let handler = GearHandler::new(Box::new(Arc::clone(&probe)));

    handler.try_add(key(0, 0), head_payload(100));
    assert!(handler.update().await);
    assert_eq!(probe.set_calls.load(Ordering::SeqCst), 1);

    // Second update with no intervening add/remove: recompute only.
    assert!(!handler.update().await);
    assert_eq!(probe.set_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn fresh_handler_update_does_not_touch_the_subsystem() {
    let probe = Arc::new(CountingGear::default());
    let handler = GearHandler::new(Box::new(Arc::clone(&probe)));
    assert!(!handler.update().await);
    assert_eq!(probe.set_calls.load(Ordering::SeqCst), 0);
    assert_eq!(probe.restore_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn losing_a_slot_restores_it_and_falls_back() {
    let probe = Arc::new(CountingGear::default());
    let handler = GearHandler::new(Box::new(Arc::clone(&probe)));

    // Gag holds Head; restraint covers Head and Body.
    handler.try_add(key(0, 0), head_payload(100));
    handler.try_add(
        key(2, -1),
        BTreeMap::from([
            (EquipSlot::Head, GearPiece::new(300)),
            (EquipSlot::Body, GearPiece::new(301)),
        ]),
    );
    handler.update().await;
    assert_eq!(
        probe.inner.snapshot().get(&EquipSlot::Head),
        Some(&GearPiece::new(100))
    );

    // Removing the gag hands Head to the restraint, no restore needed.
    handler.try_remove(&key(0, 0));
    handler.update().await;
    assert_eq!(
        probe.inner.snapshot().get(&EquipSlot::Head),
        Some(&GearPiece::new(300))
    );
    assert_eq!(probe.restore_calls.load(Ordering::SeqCst), 0);

    // Removing the restraint empties the domain; both slots are restored.
    handler.try_remove(&key(2, -1));
    handler.update().await;
    assert!(probe.inner.snapshot().is_empty());
    assert_eq!(probe.restore_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn clear_and_apply_restores_only_when_something_was_applied() {
    let probe = Arc::new(CountingGear::default());
    let handler = GearHandler::new(Box::new(Arc::clone(&probe)));

    // Nothing ever applied: clear must not call out.
    handler.clear_and_apply().await;
    assert_eq!(probe.restore_calls.load(Ordering::SeqCst), 0);

    handler.try_add(key(0, 0), head_payload(100));
    handler.update().await;
    handler.clear_and_apply().await;
    assert_eq!(probe.restore_calls.load(Ordering::SeqCst), 1);
    assert!(probe.inner.snapshot().is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Failure / retry
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn failed_application_is_retried_on_next_update() {
    let probe = Arc::new(FlakyProfile::default());
    let handler = ProfileHandler::new(Box::new(Arc::clone(&probe)));
    let profile = ProfileRef::new(ProfileId::generate(), "bound-look");

    handler.try_add(key(0, 0), profile.clone());
    assert!(!handler.update().await, "apply fails, cache stays authoritative");
    assert_eq!(handler.resolved(), Some(profile.clone()));

    // Subsystem comes back; the same final value is applied this time.
    probe.healthy.store(true, Ordering::SeqCst);
    assert!(handler.update().await);
    assert_eq!(probe.enable_calls.load(Ordering::SeqCst), 2);

    // And no third call once committed.
    assert!(!handler.update().await);
    assert_eq!(probe.enable_calls.load(Ordering::SeqCst), 2);
}

// ─────────────────────────────────────────────────────────────────────────────
// Reconciliation
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn reconcile_reapplies_tampered_slots() {
    let probe = Arc::new(CountingGear::default());
    let handler = GearHandler::new(Box::new(Arc::clone(&probe)));

    handler.try_add(key(0, 0), head_payload(100));
    handler.update().await;

    // User swaps the forced head piece through the native UI.
    probe.inner.tamper(EquipSlot::Head, Some(GearPiece::new(999)));
    handler.reconcile().await;
    assert_eq!(
        probe.inner.snapshot().get(&EquipSlot::Head),
        Some(&GearPiece::new(100))
    );
}

#[tokio::test]
async fn reconcile_without_divergence_is_quiet() {
    let probe = Arc::new(CountingGear::default());
    let handler = GearHandler::new(Box::new(Arc::clone(&probe)));

    handler.try_add(key(0, 0), head_payload(100));
    handler.update().await;
    let calls = probe.set_calls.load(Ordering::SeqCst);

    handler.reconcile().await;
    assert_eq!(probe.set_calls.load(Ordering::SeqCst), calls);
}

#[tokio::test]
async fn reconcile_is_ignored_while_apply_in_flight() {
    let probe = Arc::new(BlockingGear::default());
    let handler = Arc::new(GearHandler::new(Box::new(Arc::clone(&probe))));

    handler.try_add(key(0, 0), head_payload(100));

    let updater = Arc::clone(&handler);
    let task = tokio::spawn(async move { updater.update().await });

    // Wait until the applier is mid-flight, then deliver a notification.
    probe.entered.notified().await;
    handler.reconcile().await;

    probe.release.notify_one();
    assert!(task.await.unwrap());

    // Only the original update reached the subsystem; the notification was
    // dropped, not queued.
    assert_eq!(probe.set_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn status_reconcile_restores_missing_statuses() {
    let probe = Arc::new(CountingStatus::default());
    let handler = StatusHandler::new(Box::new(Arc::clone(&probe)));
    let sleepy = StatusId::generate();
    let mute = StatusId::generate();

    handler.try_add(key(0, 0), [sleepy, mute].into());
    handler.update().await;
    assert_eq!(probe.inner.snapshot().len(), 2);

    // User dispels one status natively.
    probe.inner.tamper_remove(mute);
    handler.reconcile().await;
    assert!(probe.inner.snapshot().contains(&mute));
    assert_eq!(probe.apply_calls.load(Ordering::SeqCst), 2);
}

// ─────────────────────────────────────────────────────────────────────────────
// In-process domains
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn trait_union_tracks_adds_and_removes() {
    use tether_types::TraitFlags;

    let handler = TraitHandler::new();
    handler.try_add(key(0, 0), TraitFlags::GAGGED);
    handler.try_add(key(1, 0), TraitFlags::GAGGED | TraitFlags::IMMOBILE);
    handler.update();
    assert_eq!(handler.current(), TraitFlags::GAGGED | TraitFlags::IMMOBILE);

    // GAGGED is still contributed by the other entry after one remove.
    handler.try_remove(&key(0, 0));
    handler.update();
    assert_eq!(handler.current(), TraitFlags::GAGGED | TraitFlags::IMMOBILE);

    handler.try_remove(&key(1, 0));
    handler.update();
    assert_eq!(handler.current(), TraitFlags::empty());
}

#[test]
fn intensity_level_jumps_up_and_decays_down() {
    let handler = IntensityHandler::new();
    handler.try_add(key(0, 0), 40.0);
    handler.update();
    assert_eq!(handler.level(), 40.0);

    // Baseline drops; the level only decays toward it.
    handler.try_remove(&key(0, 0));
    handler.try_add(key(1, 0), 10.0);
    handler.update();
    assert_eq!(handler.baseline(), 10.0);
    assert_eq!(handler.level(), 40.0);

    handler.tick(Duration::from_secs(2), 5.0);
    assert_eq!(handler.level(), 30.0);

    // Never decays past the baseline.
    handler.tick(Duration::from_secs(60), 5.0);
    assert_eq!(handler.level(), 10.0);
}
