//! Dry-run appliers: in-memory stand-ins for the external subsystems.
//!
//! Used by the CLI harness and by tests. Each one records the state it
//! was asked to apply so read-backs and tamper simulation work, and logs
//! every call in the engine's bracket-tag style.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use tether_types::{
    EquipSlot, GearPiece, MetaFlag, ModIdentity, OverlayDescriptor, PresetPayload, ProfileRef,
    StatusId,
};

use super::{
    ApplyError, GearApplier, MetaApplier, OverlayApplier, PresetApplier, PresetStatus,
    ProfileApplier, StatusApplier,
};

#[derive(Debug, Default)]
pub struct DryRunGear {
    equipment: Mutex<BTreeMap<EquipSlot, GearPiece>>,
}

impl DryRunGear {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an out-of-band change (the user swapping gear natively).
    pub fn tamper(&self, slot: EquipSlot, piece: Option<GearPiece>) {
        let mut equipment = self.equipment.lock().unwrap();
        match piece {
            Some(p) => {
                equipment.insert(slot, p);
            }
            None => {
                equipment.remove(&slot);
            }
        }
    }

    pub fn snapshot(&self) -> BTreeMap<EquipSlot, GearPiece> {
        self.equipment.lock().unwrap().clone()
    }
}

#[async_trait]
impl GearApplier for DryRunGear {
    async fn set_slot(&self, slot: EquipSlot, piece: GearPiece) -> Result<(), ApplyError> {
        tracing::info!("[GEAR] set {slot} -> {piece}");
        self.equipment.lock().unwrap().insert(slot, piece);
        Ok(())
    }

    async fn restore_slot(&self, slot: EquipSlot) -> Result<(), ApplyError> {
        tracing::info!("[GEAR] restore {slot}");
        self.equipment.lock().unwrap().remove(&slot);
        Ok(())
    }

    async fn current_equipment(&self) -> Result<BTreeMap<EquipSlot, GearPiece>, ApplyError> {
        Ok(self.snapshot())
    }
}

#[derive(Debug, Default)]
pub struct DryRunMeta {
    flags: Mutex<BTreeMap<MetaFlag, bool>>,
}

impl DryRunMeta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> BTreeMap<MetaFlag, bool> {
        self.flags.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetaApplier for DryRunMeta {
    async fn set_flag(&self, flag: MetaFlag, value: Option<bool>) -> Result<(), ApplyError> {
        tracing::info!("[META] set {flag} -> {value:?}");
        let mut flags = self.flags.lock().unwrap();
        match value {
            Some(v) => {
                flags.insert(flag, v);
            }
            None => {
                flags.remove(&flag);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct DryRunPreset {
    overrides: Mutex<BTreeMap<ModIdentity, PresetPayload>>,
}

impl DryRunPreset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> BTreeMap<ModIdentity, PresetPayload> {
        self.overrides.lock().unwrap().clone()
    }
}

#[async_trait]
impl PresetApplier for DryRunPreset {
    async fn upsert(&self, id: &ModIdentity, payload: &PresetPayload) -> PresetStatus {
        tracing::info!("[PRESET] upsert {id} at priority {}", payload.priority);
        self.overrides
            .lock()
            .unwrap()
            .insert(id.clone(), payload.clone());
        PresetStatus::Success
    }

    async fn remove(&self, id: &ModIdentity) -> PresetStatus {
        tracing::info!("[PRESET] remove {id}");
        match self.overrides.lock().unwrap().remove(id) {
            Some(_) => PresetStatus::Success,
            None => PresetStatus::ModMissing,
        }
    }
}

#[derive(Debug, Default)]
pub struct DryRunStatus {
    active: Mutex<BTreeSet<StatusId>>,
}

impl DryRunStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an out-of-band removal (the user dispelling a status).
    pub fn tamper_remove(&self, id: StatusId) {
        self.active.lock().unwrap().remove(&id);
    }

    pub fn snapshot(&self) -> BTreeSet<StatusId> {
        self.active.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatusApplier for DryRunStatus {
    async fn apply(&self, add: &[StatusId]) -> Result<(), ApplyError> {
        tracing::info!("[STATUS] apply {} status(es)", add.len());
        self.active.lock().unwrap().extend(add.iter().copied());
        Ok(())
    }

    async fn remove(&self, remove: &[StatusId]) -> Result<(), ApplyError> {
        tracing::info!("[STATUS] remove {} status(es)", remove.len());
        let mut active = self.active.lock().unwrap();
        for id in remove {
            active.remove(id);
        }
        Ok(())
    }

    async fn active(&self) -> Result<BTreeSet<StatusId>, ApplyError> {
        Ok(self.snapshot())
    }
}

#[derive(Debug, Default)]
pub struct DryRunProfile {
    active: Mutex<Option<ProfileRef>>,
}

impl DryRunProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the user switching profiles behind the engine's back.
    pub fn tamper(&self, profile: Option<ProfileRef>) {
        *self.active.lock().unwrap() = profile;
    }

    pub fn snapshot(&self) -> Option<ProfileRef> {
        self.active.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProfileApplier for DryRunProfile {
    async fn enable(&self, profile: &ProfileRef) -> Result<(), ApplyError> {
        tracing::info!("[PROFILE] enable {profile}");
        *self.active.lock().unwrap() = Some(profile.clone());
        Ok(())
    }

    async fn disable(&self) -> Result<(), ApplyError> {
        tracing::info!("[PROFILE] disable");
        *self.active.lock().unwrap() = None;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct DryRunOverlay {
    active: Mutex<Option<OverlayDescriptor>>,
}

impl DryRunOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tamper_clear(&self) {
        *self.active.lock().unwrap() = None;
    }

    pub fn snapshot(&self) -> Option<OverlayDescriptor> {
        self.active.lock().unwrap().clone()
    }
}

#[async_trait]
impl OverlayApplier for DryRunOverlay {
    async fn set(&self, overlay: &OverlayDescriptor) -> Result<(), ApplyError> {
        tracing::info!("[OVERLAY] set {overlay}");
        *self.active.lock().unwrap() = Some(overlay.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), ApplyError> {
        tracing::info!("[OVERLAY] clear");
        *self.active.lock().unwrap() = None;
        Ok(())
    }
}

// Arc delegation impls so a harness can keep a tamper/snapshot handle on
// the same instance the engine owns.

#[async_trait]
impl GearApplier for Arc<DryRunGear> {
    async fn set_slot(&self, slot: EquipSlot, piece: GearPiece) -> Result<(), ApplyError> {
        self.as_ref().set_slot(slot, piece).await
    }

    async fn restore_slot(&self, slot: EquipSlot) -> Result<(), ApplyError> {
        self.as_ref().restore_slot(slot).await
    }

    async fn current_equipment(&self) -> Result<BTreeMap<EquipSlot, GearPiece>, ApplyError> {
        self.as_ref().current_equipment().await
    }
}

#[async_trait]
impl MetaApplier for Arc<DryRunMeta> {
    async fn set_flag(&self, flag: MetaFlag, value: Option<bool>) -> Result<(), ApplyError> {
        self.as_ref().set_flag(flag, value).await
    }
}

#[async_trait]
impl PresetApplier for Arc<DryRunPreset> {
    async fn upsert(&self, id: &ModIdentity, payload: &PresetPayload) -> PresetStatus {
        self.as_ref().upsert(id, payload).await
    }

    async fn remove(&self, id: &ModIdentity) -> PresetStatus {
        self.as_ref().remove(id).await
    }
}

#[async_trait]
impl StatusApplier for Arc<DryRunStatus> {
    async fn apply(&self, add: &[StatusId]) -> Result<(), ApplyError> {
        self.as_ref().apply(add).await
    }

    async fn remove(&self, remove: &[StatusId]) -> Result<(), ApplyError> {
        self.as_ref().remove(remove).await
    }

    async fn active(&self) -> Result<BTreeSet<StatusId>, ApplyError> {
        self.as_ref().active().await
    }
}

#[async_trait]
impl ProfileApplier for Arc<DryRunProfile> {
    async fn enable(&self, profile: &ProfileRef) -> Result<(), ApplyError> {
        self.as_ref().enable(profile).await
    }

    async fn disable(&self) -> Result<(), ApplyError> {
        self.as_ref().disable().await
    }
}

#[async_trait]
impl OverlayApplier for Arc<DryRunOverlay> {
    async fn set(&self, overlay: &OverlayDescriptor) -> Result<(), ApplyError> {
        self.as_ref().set(overlay).await
    }

    async fn clear(&self) -> Result<(), ApplyError> {
        self.as_ref().clear().await
    }
}
