//! External presentation-subsystem boundaries.
//!
//! Each domain handler talks to its presentation subsystem through one of
//! these narrow traits. Failures are non-fatal: the handler logs them and
//! leaves its cache authoritative, retrying on the next update or
//! reconciliation pass.

mod dry_run;

pub use dry_run::{
    DryRunGear, DryRunMeta, DryRunOverlay, DryRunPreset, DryRunProfile, DryRunStatus,
};

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use thiserror::Error;

use tether_types::{
    EquipSlot, GearPiece, MetaFlag, ModIdentity, OverlayDescriptor, PresetPayload, ProfileRef,
    StatusId,
};

/// Failure applying a resolved value to an external subsystem.
#[derive(Debug, Error)]
pub enum ApplyError {
    /// The subsystem is not loaded or not responding.
    #[error("subsystem unavailable: {0}")]
    Unavailable(String),

    /// The subsystem refused the request.
    #[error("subsystem rejected the request: {0}")]
    Rejected(String),
}

/// Outcome of a mod-preset operation. The mod manager reports these as
/// status codes, never as exceptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetStatus {
    Success,
    ModMissing,
    InvalidPayload,
    Busy,
}

impl PresetStatus {
    pub fn is_success(self) -> bool {
        self == PresetStatus::Success
    }
}

/// Appearance subsystem: slot-by-slot equipment writes plus a read-back of
/// the full applied state, used to restore slots the engine no longer holds.
#[async_trait]
pub trait GearApplier: Send + Sync {
    async fn set_slot(&self, slot: EquipSlot, piece: GearPiece) -> Result<(), ApplyError>;
    async fn restore_slot(&self, slot: EquipSlot) -> Result<(), ApplyError>;
    async fn current_equipment(&self) -> Result<BTreeMap<EquipSlot, GearPiece>, ApplyError>;
}

/// Appearance meta-flag subsystem. `None` unsets a flag.
#[async_trait]
pub trait MetaApplier: Send + Sync {
    async fn set_flag(&self, flag: MetaFlag, value: Option<bool>) -> Result<(), ApplyError>;
}

/// Mod manager: temporary locked configuration overrides keyed by mod.
#[async_trait]
pub trait PresetApplier: Send + Sync {
    async fn upsert(&self, id: &ModIdentity, payload: &PresetPayload) -> PresetStatus;
    async fn remove(&self, id: &ModIdentity) -> PresetStatus;
}

/// Timed-status subsystem: apply/remove by GUID plus a read-back of the
/// currently-active set for reconciliation.
#[async_trait]
pub trait StatusApplier: Send + Sync {
    async fn apply(&self, add: &[StatusId]) -> Result<(), ApplyError>;
    async fn remove(&self, remove: &[StatusId]) -> Result<(), ApplyError>;
    async fn active(&self) -> Result<BTreeSet<StatusId>, ApplyError>;
}

/// Cosmetic-profile subsystem: exactly one named profile enabled at a time.
#[async_trait]
pub trait ProfileApplier: Send + Sync {
    async fn enable(&self, profile: &ProfileRef) -> Result<(), ApplyError>;
    async fn disable(&self) -> Result<(), ApplyError>;
}

/// Screen-overlay subsystem: one active overlay or none.
#[async_trait]
pub trait OverlayApplier: Send + Sync {
    async fn set(&self, overlay: &OverlayDescriptor) -> Result<(), ApplyError>;
    async fn clear(&self) -> Result<(), ApplyError>;
}
