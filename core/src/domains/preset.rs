//! Mod-preset domain: per-mod override resolution.

use std::collections::BTreeMap;

use tether_types::{ModIdentity, PresetPayload};

use super::Resolve;
use crate::store::Contributions;

/// Resolved mod overrides: one locked preset per touched mod.
pub type PresetFinal = BTreeMap<ModIdentity, PresetPayload>;

/// Per-mod first-wins: when two contributions override the same mod, the
/// lowest-keyed one holds it.
#[derive(Debug, Default)]
pub struct PresetResolver;

impl Resolve for PresetResolver {
    type Payload = BTreeMap<ModIdentity, PresetPayload>;
    type Final = PresetFinal;

    fn neutral(&self) -> Self::Final {
        BTreeMap::new()
    }

    fn resolve(&self, entries: &Contributions<Self::Payload>) -> Self::Final {
        let mut resolved = BTreeMap::new();
        for (_, payload) in entries.iter() {
            for (id, preset) in payload {
                resolved
                    .entry(id.clone())
                    .or_insert_with(|| preset.clone());
            }
        }
        resolved
    }
}
