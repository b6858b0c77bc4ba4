//! Built-in demo items for driving the engine from the REPL.

use tether_core::{ServerSnapshot, SnapshotEntry, SourceItem, NO_LAYER};
use tether_types::{
    ContributorId, EquipSlot, GearPiece, MetaFlag, ModIdentity, OverlayDescriptor, PresetPayload,
    ProfileId, ProfileRef, SourceKind, StatusId, TraitFlags,
};

pub const NAMES: [&str; 5] = [
    "ball-gag",
    "ring-gag",
    "blindfold",
    "leather-cuffs",
    "straitjacket",
];

pub fn find(name: &str) -> Option<SourceItem> {
    let item = match name {
        "ball-gag" => SourceItem::new(SourceKind::Gag, "ball gag")
            .with_gear(EquipSlot::Head, GearPiece::with_dyes(23001, 3, 0))
            .with_traits(TraitFlags::GAGGED)
            .with_status(StatusId::generate())
            .with_intensity(15.0),
        "ring-gag" => SourceItem::new(SourceKind::Gag, "ring gag")
            .with_gear(EquipSlot::Head, GearPiece::new(23002))
            .with_traits(TraitFlags::GAGGED)
            .with_intensity(10.0),
        "blindfold" => SourceItem::new(SourceKind::Restriction, "leather blindfold")
            .with_gear(EquipSlot::Head, GearPiece::new(24001))
            .with_meta(MetaFlag::Headgear, true)
            .with_overlay(OverlayDescriptor::blindfold("blindfold_dark.png", 0.95))
            .with_traits(TraitFlags::BLINDFOLDED)
            .with_intensity(20.0),
        "leather-cuffs" => SourceItem::new(SourceKind::Restriction, "leather cuffs")
            .with_gear(EquipSlot::Wrists, GearPiece::new(24002))
            .with_status(StatusId::generate())
            .with_traits(TraitFlags::BOUND_ARMS)
            .with_intensity(10.0),
        "straitjacket" => SourceItem::new(SourceKind::Restraint, "straitjacket")
            .with_gear(EquipSlot::Head, GearPiece::new(25001))
            .with_gear(EquipSlot::Body, GearPiece::new(25002))
            .with_gear(EquipSlot::Hands, GearPiece::new(25003))
            .with_preset(
                ModIdentity::new("restraint-pack", "Straitjacket Textures"),
                PresetPayload::new(99).with_setting("Fit", vec!["Tight".to_string()]),
            )
            .with_profile(ProfileRef::new(ProfileId::generate(), "restrained-look"))
            .with_traits(TraitFlags::BOUND_ARMS | TraitFlags::WEIGHTY)
            .with_intensity(35.0),
        _ => return None,
    };
    Some(item)
}

/// A canned "server says these are active" snapshot for the connect command.
pub fn demo_snapshot() -> ServerSnapshot {
    let keyholder = ContributorId::new("keyholder");
    ServerSnapshot {
        gags: vec![SnapshotEntry {
            layer: 0,
            contributor: keyholder.clone(),
            item: find("ball-gag").expect("catalog item"),
        }],
        restrictions: vec![SnapshotEntry {
            layer: 0,
            contributor: keyholder.clone(),
            item: find("leather-cuffs").expect("catalog item"),
        }],
        restraint: Some(SnapshotEntry {
            layer: NO_LAYER,
            contributor: keyholder,
            item: find("straitjacket").expect("catalog item"),
        }),
    }
}
