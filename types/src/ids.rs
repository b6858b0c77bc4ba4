//! Strongly-typed identifiers shared between the engine and its consumers.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which restriction store produced a contribution.
///
/// The precedence between kinds is *not* encoded here; the engine maps each
/// kind to a priority ordinal through its configured policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    /// Layered mouth gags (multiple slots).
    Gag,
    /// Individual body restrictions (multiple slots).
    Restriction,
    /// A whole restraint outfit (single slot).
    Restraint,
}

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [
        SourceKind::Gag,
        SourceKind::Restriction,
        SourceKind::Restraint,
    ];
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Gag => write!(f, "gag"),
            SourceKind::Restriction => write!(f, "restriction"),
            SourceKind::Restraint => write!(f, "restraint"),
        }
    }
}

/// Identity of the player that enabled a contribution.
///
/// Used for provenance and audit logging only, never for ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContributorId(String);

impl ContributorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Contributor for actions the local player performed on themselves.
    pub fn local() -> Self {
        Self("self".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContributorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// GUID of a timed status effect in the status plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StatusId(Uuid);

impl StatusId {
    pub fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for StatusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status:{}", self.0)
    }
}

/// GUID of a cosmetic profile in the profile plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProfileId(Uuid);

impl ProfileId {
    pub fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "profile:{}", self.0)
    }
}

/// Reference to one named cosmetic profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRef {
    pub id: ProfileId,
    pub name: String,
}

impl ProfileRef {
    pub fn new(id: ProfileId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl fmt::Display for ProfileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}
