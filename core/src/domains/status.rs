//! Timed-status domain: union resolution over status GUID sets.

use std::collections::BTreeSet;

use tether_types::StatusId;

use super::Resolve;
use crate::store::Contributions;

/// Union of every contribution's status set; commutative and
/// order-independent by construction.
#[derive(Debug, Default)]
pub struct StatusResolver;

impl Resolve for StatusResolver {
    type Payload = BTreeSet<StatusId>;
    type Final = BTreeSet<StatusId>;

    fn neutral(&self) -> Self::Final {
        BTreeSet::new()
    }

    fn resolve(&self, entries: &Contributions<Self::Payload>) -> Self::Final {
        let mut resolved = BTreeSet::new();
        for (_, payload) in entries.iter() {
            resolved.extend(payload.iter().copied());
        }
        resolved
    }
}
