mod gear;
mod ids;
mod meta;
mod overlay;
mod presets;
mod traits;

pub use gear::{EquipSlot, GearPiece};
pub use ids::{ContributorId, ProfileId, ProfileRef, SourceKind, StatusId};
pub use meta::MetaFlag;
pub use overlay::{OverlayDescriptor, OverlayKind};
pub use presets::{ModIdentity, PresetPayload};
pub use traits::TraitFlags;
