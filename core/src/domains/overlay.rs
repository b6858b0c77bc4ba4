//! Screen-overlay domain: first-wins with blindfold/hypnotic exclusivity.

use tether_types::{OverlayDescriptor, OverlayKind};

use super::Resolve;
use crate::store::Contributions;

/// The lowest-keyed entry supplies the active overlay. One contribution
/// may carry several descriptors (an outfit with both a blindfold and a
/// hypnotic pattern); exactly one survives resolution, chosen by the
/// configured preference.
#[derive(Debug)]
pub struct OverlayResolver {
    preference: OverlayKind,
}

impl OverlayResolver {
    pub fn new(preference: OverlayKind) -> Self {
        Self { preference }
    }
}

impl Default for OverlayResolver {
    fn default() -> Self {
        Self::new(OverlayKind::Blindfold)
    }
}

impl Resolve for OverlayResolver {
    type Payload = Vec<OverlayDescriptor>;
    type Final = Option<OverlayDescriptor>;

    fn neutral(&self) -> Self::Final {
        None
    }

    fn resolve(&self, entries: &Contributions<Self::Payload>) -> Self::Final {
        // Skip entries whose payload is empty so a later key can win.
        for (_, descriptors) in entries.iter() {
            if let Some(preferred) = descriptors.iter().find(|d| d.kind == self.preference) {
                return Some(preferred.clone());
            }
            if let Some(first) = descriptors.first() {
                return Some(first.clone());
            }
        }
        None
    }
}
