//! Appearance equipment domain: per-slot override resolution.

use std::collections::BTreeMap;

use tether_types::{EquipSlot, GearPiece};

use super::Resolve;
use crate::store::Contributions;

/// The resolved equipment override: only slots some contribution defines.
pub type GearFinal = BTreeMap<EquipSlot, GearPiece>;

/// Per-slot first-wins: each slot takes the lowest-keyed entry that
/// defines it, independently of every other slot.
#[derive(Debug, Default)]
pub struct GearResolver;

impl Resolve for GearResolver {
    type Payload = BTreeMap<EquipSlot, GearPiece>;
    type Final = GearFinal;

    fn neutral(&self) -> Self::Final {
        BTreeMap::new()
    }

    fn resolve(&self, entries: &Contributions<Self::Payload>) -> Self::Final {
        let mut resolved = BTreeMap::new();
        for (_, payload) in entries.iter() {
            for (&slot, &piece) in payload {
                resolved.entry(slot).or_insert(piece);
            }
        }
        resolved
    }
}
