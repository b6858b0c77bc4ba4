//! Gameplay restriction traits.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Hardcore gameplay restrictions contributed by active items.
    ///
    /// The union across all contributions is consumed in-process by the
    /// gameplay-restriction evaluator; nothing is pushed externally.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct TraitFlags: u16 {
        /// Speech is garbled.
        const GAGGED       = 1 << 0;
        /// Vision is obscured.
        const BLINDFOLDED  = 1 << 1;
        /// Game audio is muffled.
        const DEAFENED     = 1 << 2;
        /// Movement is locked.
        const IMMOBILE     = 1 << 3;
        /// Arms are bound; hand actions blocked.
        const BOUND_ARMS   = 1 << 4;
        /// Legs are bound; forced walk.
        const BOUND_LEGS   = 1 << 5;
        /// Forced slow movement from heavy restraints.
        const WEIGHTY      = 1 << 6;
        /// Automatic follow of the contributor.
        const LEASHED      = 1 << 7;
    }
}

impl Default for TraitFlags {
    fn default() -> Self {
        TraitFlags::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_is_order_independent() {
        let a = TraitFlags::GAGGED | TraitFlags::IMMOBILE;
        let b = TraitFlags::BLINDFOLDED;
        assert_eq!(a | b, b | a);
        assert_eq!((a | b) & TraitFlags::IMMOBILE, TraitFlags::IMMOBILE);
    }

    #[test]
    fn serde_round_trip() {
        let flags = TraitFlags::GAGGED | TraitFlags::LEASHED;
        let json = serde_json::to_string(&flags).unwrap();
        let back: TraitFlags = serde_json::from_str(&json).unwrap();
        assert_eq!(flags, back);
    }
}
