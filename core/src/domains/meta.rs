//! Appearance meta-flag domain: per-flag override resolution.

use std::collections::BTreeMap;

use tether_types::MetaFlag;

use super::Resolve;
use crate::store::Contributions;

/// Resolved flag states. Flags absent from the map are left unset at the
/// external boundary.
pub type MetaFinal = BTreeMap<MetaFlag, bool>;

/// Per-flag first-wins over the sorted entry set.
#[derive(Debug, Default)]
pub struct MetaResolver;

impl Resolve for MetaResolver {
    type Payload = BTreeMap<MetaFlag, bool>;
    type Final = MetaFinal;

    fn neutral(&self) -> Self::Final {
        BTreeMap::new()
    }

    fn resolve(&self, entries: &Contributions<Self::Payload>) -> Self::Final {
        let mut resolved = BTreeMap::new();
        for (_, payload) in entries.iter() {
            for (&flag, &state) in payload {
                resolved.entry(flag).or_insert(state);
            }
        }
        resolved
    }
}
