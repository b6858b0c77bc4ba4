//! Equipment slot and item types for the appearance domain.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Visible equipment slots the engine can override.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum EquipSlot {
    Head,
    Body,
    Hands,
    Legs,
    Feet,
    Ears,
    Neck,
    Wrists,
    RingRight,
    RingLeft,
}

impl EquipSlot {
    pub const ALL: [EquipSlot; 10] = [
        EquipSlot::Head,
        EquipSlot::Body,
        EquipSlot::Hands,
        EquipSlot::Legs,
        EquipSlot::Feet,
        EquipSlot::Ears,
        EquipSlot::Neck,
        EquipSlot::Wrists,
        EquipSlot::RingRight,
        EquipSlot::RingLeft,
    ];
}

impl fmt::Display for EquipSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EquipSlot::Head => "head",
            EquipSlot::Body => "body",
            EquipSlot::Hands => "hands",
            EquipSlot::Legs => "legs",
            EquipSlot::Feet => "feet",
            EquipSlot::Ears => "ears",
            EquipSlot::Neck => "neck",
            EquipSlot::Wrists => "wrists",
            EquipSlot::RingRight => "ring-right",
            EquipSlot::RingLeft => "ring-left",
        };
        write!(f, "{name}")
    }
}

/// One item forced into an equipment slot, with its dye channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GearPiece {
    pub item_id: u64,
    /// Dye IDs for the two stain channels (0 = undyed).
    pub dyes: [u8; 2],
}

impl GearPiece {
    pub fn new(item_id: u64) -> Self {
        Self {
            item_id,
            dyes: [0, 0],
        }
    }

    pub fn with_dyes(item_id: u64, primary: u8, secondary: u8) -> Self {
        Self {
            item_id,
            dyes: [primary, secondary],
        }
    }
}

impl fmt::Display for GearPiece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item {} (dyes {}/{})", self.item_id, self.dyes[0], self.dyes[1])
    }
}
