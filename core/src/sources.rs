//! Source-manager model: the items whose lifecycle drives the caches.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use tether_types::{
    ContributorId, EquipSlot, GearPiece, MetaFlag, ModIdentity, OverlayDescriptor, PresetPayload,
    ProfileRef, SourceKind, StatusId, TraitFlags,
};

/// Maps each source kind to its priority ordinal (lower wins).
///
/// The ordering between the three source managers is policy, not a
/// hard-coded constant; it is loaded from configuration and pinned by a
/// test in the manager suite.
#[derive(Debug, Clone)]
pub struct PrecedencePolicy {
    order: Vec<SourceKind>,
}

impl PrecedencePolicy {
    /// Build a policy from an ordering, first entry = highest precedence.
    /// Duplicates keep their first position; kinds missing from the input
    /// are appended in default order with a warning.
    pub fn new(order: &[SourceKind]) -> Self {
        let mut seen = Vec::new();
        for &kind in order {
            if !seen.contains(&kind) {
                seen.push(kind);
            }
        }
        for kind in SourceKind::ALL {
            if !seen.contains(&kind) {
                tracing::warn!("[CACHE] precedence policy missing {kind}, appending");
                seen.push(kind);
            }
        }
        Self { order: seen }
    }

    pub fn priority(&self, kind: SourceKind) -> u8 {
        // new() guarantees every kind is present.
        self.order.iter().position(|&k| k == kind).unwrap_or(u8::MAX as usize) as u8
    }
}

impl Default for PrecedencePolicy {
    fn default() -> Self {
        Self::new(&SourceKind::ALL)
    }
}

/// One restriction item as its source manager describes it, carrying the
/// payload it contributes to each domain. Empty collections (and `None`)
/// mean the item does not touch that domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceItem {
    pub source: SourceKind,
    pub label: String,
    #[serde(default)]
    pub gear: BTreeMap<EquipSlot, GearPiece>,
    #[serde(default)]
    pub meta: BTreeMap<MetaFlag, bool>,
    #[serde(default)]
    pub presets: BTreeMap<ModIdentity, PresetPayload>,
    #[serde(default)]
    pub statuses: BTreeSet<StatusId>,
    #[serde(default)]
    pub profile: Option<ProfileRef>,
    #[serde(default)]
    pub overlays: Vec<OverlayDescriptor>,
    #[serde(default)]
    pub trait_flags: TraitFlags,
    #[serde(default)]
    pub intensity: Option<f32>,
}

impl SourceItem {
    pub fn new(source: SourceKind, label: impl Into<String>) -> Self {
        Self {
            source,
            label: label.into(),
            gear: BTreeMap::new(),
            meta: BTreeMap::new(),
            presets: BTreeMap::new(),
            statuses: BTreeSet::new(),
            profile: None,
            overlays: Vec::new(),
            trait_flags: TraitFlags::empty(),
            intensity: None,
        }
    }

    pub fn with_gear(mut self, slot: EquipSlot, piece: GearPiece) -> Self {
        self.gear.insert(slot, piece);
        self
    }

    pub fn with_meta(mut self, flag: MetaFlag, state: bool) -> Self {
        self.meta.insert(flag, state);
        self
    }

    pub fn with_preset(mut self, id: ModIdentity, payload: PresetPayload) -> Self {
        self.presets.insert(id, payload);
        self
    }

    pub fn with_status(mut self, id: StatusId) -> Self {
        self.statuses.insert(id);
        self
    }

    pub fn with_profile(mut self, profile: ProfileRef) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn with_overlay(mut self, overlay: OverlayDescriptor) -> Self {
        self.overlays.push(overlay);
        self
    }

    pub fn with_traits(mut self, flags: TraitFlags) -> Self {
        self.trait_flags |= flags;
        self
    }

    pub fn with_intensity(mut self, weight: f32) -> Self {
        self.intensity = Some(weight);
        self
    }

    /// Names of the domains this item contributes to, for audit records.
    pub fn touched_domains(&self) -> Vec<&'static str> {
        let mut touched = Vec::new();
        if !self.gear.is_empty() {
            touched.push("gear");
        }
        if !self.meta.is_empty() {
            touched.push("meta");
        }
        if !self.presets.is_empty() {
            touched.push("preset");
        }
        if !self.statuses.is_empty() {
            touched.push("status");
        }
        if self.profile.is_some() {
            touched.push("profile");
        }
        if !self.overlays.is_empty() {
            touched.push("overlay");
        }
        if !self.trait_flags.is_empty() {
            touched.push("traits");
        }
        if self.intensity.is_some() {
            touched.push("intensity");
        }
        touched
    }
}

/// One server-confirmed active item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub layer: i8,
    pub contributor: ContributorId,
    pub item: SourceItem,
}

/// Everything the server reports active at (re)connect, grouped by source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSnapshot {
    #[serde(default)]
    pub gags: Vec<SnapshotEntry>,
    #[serde(default)]
    pub restrictions: Vec<SnapshotEntry>,
    #[serde(default)]
    pub restraint: Option<SnapshotEntry>,
}

impl ServerSnapshot {
    pub fn entries(&self) -> impl Iterator<Item = &SnapshotEntry> {
        self.gags
            .iter()
            .chain(self.restrictions.iter())
            .chain(self.restraint.iter())
    }

    pub fn len(&self) -> usize {
        self.gags.len() + self.restrictions.len() + usize::from(self.restraint.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
