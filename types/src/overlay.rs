//! Screen overlay descriptors.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The two mutually exclusive full-screen overlay families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverlayKind {
    Blindfold,
    Hypnotic,
}

impl fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlayKind::Blindfold => write!(f, "blindfold"),
            OverlayKind::Hypnotic => write!(f, "hypnotic"),
        }
    }
}

/// One active screen overlay. A descriptor is either a blindfold or a
/// hypnotic effect; the exclusivity rule lives in the descriptor itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayDescriptor {
    pub kind: OverlayKind,
    /// Path or plugin-relative name of the overlay asset.
    pub asset: String,
    /// 0.0 (invisible) ..= 1.0 (fully opaque).
    pub opacity: f32,
}

impl OverlayDescriptor {
    pub fn blindfold(asset: impl Into<String>, opacity: f32) -> Self {
        Self {
            kind: OverlayKind::Blindfold,
            asset: asset.into(),
            opacity,
        }
    }

    pub fn hypnotic(asset: impl Into<String>, opacity: f32) -> Self {
        Self {
            kind: OverlayKind::Hypnotic,
            asset: asset.into(),
            opacity,
        }
    }
}

impl fmt::Display for OverlayDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} overlay '{}' @ {:.0}%", self.kind, self.asset, self.opacity * 100.0)
    }
}
