//! Appearance meta-flags: visibility toggles that sit beside the
//! slot-by-slot equipment state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Named boolean-ish appearance flags.
///
/// A domain entry that does not mention a flag leaves it untouched; the
/// applier receives `unset` for flags absent from the resolved value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum MetaFlag {
    /// Headgear shown or hidden.
    Headgear,
    /// Visor raised or lowered.
    Visor,
    /// Weapon drawn or sheathed.
    Weapon,
}

impl MetaFlag {
    pub const ALL: [MetaFlag; 3] = [MetaFlag::Headgear, MetaFlag::Visor, MetaFlag::Weapon];
}

impl fmt::Display for MetaFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaFlag::Headgear => write!(f, "headgear"),
            MetaFlag::Visor => write!(f, "visor"),
            MetaFlag::Weapon => write!(f, "weapon"),
        }
    }
}
