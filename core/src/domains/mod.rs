//! Per-domain caches and their resolution rules.
//!
//! Every visual/behavioral domain keeps its contributions in a
//! [`LayerCache`]: an ordered contribution store plus one cached final
//! value. The final value is a pure function of the current entry set —
//! it is recomputed from scratch and replaced wholesale, never mutated
//! in place. Three resolution families cover the eight domains:
//!
//! - **first-wins** (profile, overlay): the entry with the lowest key
//!   supplies the whole final value
//! - **per-slot override** (gear, meta, preset): each independent sub-slot
//!   takes the lowest-keyed entry that defines it
//! - **union/fold** (status, traits, intensity): every entry contributes

mod gear;
mod intensity;
mod meta;
mod overlay;
mod preset;
mod profile;
mod status;
mod traits;

#[cfg(test)]
mod resolve_tests;

pub use gear::{GearFinal, GearResolver};
pub use intensity::{IntensityResolver, INTENSITY_MAX};
pub use meta::{MetaFinal, MetaResolver};
pub use overlay::OverlayResolver;
pub use preset::{PresetFinal, PresetResolver};
pub use profile::ProfileResolver;
pub use status::StatusResolver;
pub use traits::TraitResolver;

use std::fmt;

use crate::keys::CacheKey;
use crate::store::Contributions;

/// Resolution rule for one domain.
pub trait Resolve {
    /// Payload one contribution carries in this domain.
    type Payload;
    /// The resolved, authoritative value for the whole domain.
    type Final: Clone + PartialEq + fmt::Debug;

    /// The well-defined value an empty entry set resolves to.
    fn neutral(&self) -> Self::Final;

    /// Fold the sorted entry set into a final value.
    fn resolve(&self, entries: &Contributions<Self::Payload>) -> Self::Final;
}

/// One domain's contribution store plus its cached final value.
#[derive(Debug)]
pub struct LayerCache<R: Resolve> {
    resolver: R,
    entries: Contributions<R::Payload>,
    final_value: R::Final,
}

impl<R: Resolve> LayerCache<R> {
    pub fn new(resolver: R) -> Self {
        let final_value = resolver.neutral();
        Self {
            resolver,
            entries: Contributions::new(),
            final_value,
        }
    }

    /// Store a contribution. Does not recompute the final value.
    pub fn try_add(&mut self, key: CacheKey, payload: R::Payload) -> bool {
        self.entries.add(key, payload)
    }

    /// Delete a contribution. Does not recompute the final value.
    pub fn try_remove(&mut self, key: &CacheKey) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Empty all entries. The caller is responsible for recomputing and
    /// reapplying afterwards.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Re-resolve over the current entry set, replacing the cached final
    /// value. Returns whether the new value differs structurally from the
    /// previous one.
    pub fn recompute_final(&mut self) -> bool {
        let next = self.resolver.resolve(&self.entries);
        let changed = next != self.final_value;
        self.final_value = next;
        changed
    }

    pub fn final_value(&self) -> &R::Final {
        &self.final_value
    }

    pub fn neutral(&self) -> R::Final {
        self.resolver.neutral()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
