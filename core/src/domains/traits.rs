//! Trait-flag domain: bit-flag union.

use tether_types::TraitFlags;

use super::Resolve;
use crate::store::Contributions;

/// Union of every contribution's flags. Consumed in-process by the
/// gameplay-restriction evaluator; no external subsystem is involved.
#[derive(Debug, Default)]
pub struct TraitResolver;

impl Resolve for TraitResolver {
    type Payload = TraitFlags;
    type Final = TraitFlags;

    fn neutral(&self) -> Self::Final {
        TraitFlags::empty()
    }

    fn resolve(&self, entries: &Contributions<Self::Payload>) -> Self::Final {
        entries
            .iter()
            .fold(TraitFlags::empty(), |acc, (_, flags)| acc | *flags)
    }
}
