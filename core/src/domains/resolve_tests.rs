//! Tests for domain cache resolution.
//!
//! Covers first-wins, per-slot override, union convergence, and the
//! empty-set neutral value across the resolver families.

use std::collections::{BTreeMap, BTreeSet};

use tether_types::{
    ContributorId, EquipSlot, GearPiece, OverlayDescriptor, OverlayKind, ProfileId, ProfileRef,
    StatusId, TraitFlags,
};

use super::*;
use crate::keys::{CacheKey, NO_LAYER};

fn key(priority: u8, layer: i8) -> CacheKey {
    CacheKey::new(priority, layer, ContributorId::new("tester"), "item")
}

fn gear_payload(slots: &[(EquipSlot, u64)]) -> BTreeMap<EquipSlot, GearPiece> {
    slots
        .iter()
        .map(|&(slot, item)| (slot, GearPiece::new(item)))
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Neutral values and the changed flag
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn empty_cache_resolves_to_neutral_without_change() {
    let mut cache = LayerCache::new(StatusResolver);
    // Fresh cache already holds the neutral value.
    assert!(!cache.recompute_final());
    assert!(cache.final_value().is_empty());
}

#[test]
fn changed_is_true_only_on_first_transition_into_emptiness() {
    let mut cache = LayerCache::new(TraitResolver);
    assert!(cache.try_add(key(0, 0), TraitFlags::GAGGED));
    assert!(cache.recompute_final());

    assert!(cache.try_remove(&key(0, 0)));
    assert!(cache.recompute_final(), "transition into emptiness");
    assert_eq!(*cache.final_value(), TraitFlags::empty());
    assert!(!cache.recompute_final(), "already empty, no change");
}

// ─────────────────────────────────────────────────────────────────────────────
// First-wins domains
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn profile_lowest_key_wins_and_falls_back_on_removal() {
    let mut cache = LayerCache::new(ProfileResolver);
    let low = ProfileRef::new(ProfileId::generate(), "gagged-look");
    let high = ProfileRef::new(ProfileId::generate(), "bound-look");

    // Insert the higher key first; the lower key must still win.
    assert!(cache.try_add(key(1, 0), high.clone()));
    assert!(cache.try_add(key(0, 0), low.clone()));
    cache.recompute_final();
    assert_eq!(cache.final_value().as_ref(), Some(&low));

    // Removing the winner falls back to the next-lowest key, not to empty.
    assert!(cache.try_remove(&key(0, 0)));
    assert!(cache.recompute_final());
    assert_eq!(cache.final_value().as_ref(), Some(&high));
}

#[test]
fn overlay_preference_breaks_same_key_ties() {
    let mut cache = LayerCache::new(OverlayResolver::new(OverlayKind::Hypnotic));
    let both = vec![
        OverlayDescriptor::blindfold("dark.png", 1.0),
        OverlayDescriptor::hypnotic("spiral.png", 0.8),
    ];
    cache.try_add(key(0, 0), both);
    cache.recompute_final();
    assert_eq!(
        cache.final_value().as_ref().map(|d| d.kind),
        Some(OverlayKind::Hypnotic)
    );
}

#[test]
fn overlay_skips_entries_with_no_descriptors() {
    let mut cache = LayerCache::new(OverlayResolver::default());
    cache.try_add(key(0, 0), Vec::new());
    cache.try_add(key(1, 0), vec![OverlayDescriptor::blindfold("dark.png", 1.0)]);
    cache.recompute_final();
    assert_eq!(
        cache.final_value().as_ref().map(|d| d.kind),
        Some(OverlayKind::Blindfold)
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Per-slot override domains
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn gear_disjoint_slots_coexist() {
    let mut cache = LayerCache::new(GearResolver);
    cache.try_add(key(0, 0), gear_payload(&[(EquipSlot::Head, 100)]));
    cache.try_add(key(1, 0), gear_payload(&[(EquipSlot::Body, 200)]));
    cache.recompute_final();

    let resolved = cache.final_value();
    assert_eq!(resolved.get(&EquipSlot::Head), Some(&GearPiece::new(100)));
    assert_eq!(resolved.get(&EquipSlot::Body), Some(&GearPiece::new(200)));
}

#[test]
fn gear_overlapping_slot_follows_first_wins_per_slot() {
    // Gag at (0,0) holds Head; restraint at (2,-1) covers Head and Body.
    let mut cache = LayerCache::new(GearResolver);
    cache.try_add(key(0, 0), gear_payload(&[(EquipSlot::Head, 100)]));
    cache.try_add(
        key(2, NO_LAYER),
        gear_payload(&[(EquipSlot::Head, 300), (EquipSlot::Body, 301)]),
    );
    cache.recompute_final();

    let resolved = cache.final_value();
    assert_eq!(resolved.get(&EquipSlot::Head), Some(&GearPiece::new(100)));
    assert_eq!(resolved.get(&EquipSlot::Body), Some(&GearPiece::new(301)));

    // Removing the gag hands Head to the restraint.
    cache.try_remove(&key(0, 0));
    assert!(cache.recompute_final());
    assert_eq!(
        cache.final_value().get(&EquipSlot::Head),
        Some(&GearPiece::new(300))
    );
}

#[test]
fn meta_flags_resolve_per_flag() {
    let mut cache = LayerCache::new(MetaResolver);
    cache.try_add(
        key(0, 0),
        BTreeMap::from([(tether_types::MetaFlag::Headgear, true)]),
    );
    cache.try_add(
        key(1, 0),
        BTreeMap::from([
            (tether_types::MetaFlag::Headgear, false),
            (tether_types::MetaFlag::Visor, true),
        ]),
    );
    cache.recompute_final();

    let resolved = cache.final_value();
    assert_eq!(resolved.get(&tether_types::MetaFlag::Headgear), Some(&true));
    assert_eq!(resolved.get(&tether_types::MetaFlag::Visor), Some(&true));
}

// ─────────────────────────────────────────────────────────────────────────────
// Union domains
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn status_union_converges_regardless_of_order() {
    let a = StatusId::generate();
    let b = StatusId::generate();

    let mut with_both = LayerCache::new(StatusResolver);
    with_both.try_add(key(0, 0), BTreeSet::from([a]));
    with_both.try_add(key(1, 0), BTreeSet::from([b]));
    with_both.recompute_final();
    with_both.try_remove(&key(0, 0));
    with_both.recompute_final();

    let mut only_b = LayerCache::new(StatusResolver);
    only_b.try_add(key(1, 0), BTreeSet::from([b]));
    only_b.recompute_final();

    assert_eq!(with_both.final_value(), only_b.final_value());
}

#[test]
fn duplicate_add_leaves_final_unchanged() {
    let mut cache = LayerCache::new(TraitResolver);
    assert!(cache.try_add(key(0, 0), TraitFlags::GAGGED));
    cache.recompute_final();

    assert!(!cache.try_add(key(0, 0), TraitFlags::BLINDFOLDED));
    assert!(!cache.recompute_final());
    assert_eq!(*cache.final_value(), TraitFlags::GAGGED);
}

#[test]
fn intensity_sum_is_clamped() {
    let mut cache = LayerCache::new(IntensityResolver);
    cache.try_add(key(0, 0), 60.0);
    cache.try_add(key(1, 0), 70.0);
    cache.recompute_final();
    assert_eq!(*cache.final_value(), INTENSITY_MAX);

    cache.try_remove(&key(1, 0));
    cache.recompute_final();
    assert_eq!(*cache.final_value(), 60.0);
}
