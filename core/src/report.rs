//! Serializable snapshot of the engine's resolved state.

use serde::Serialize;

use tether_types::TraitFlags;

use crate::manager::SessionPhase;

/// Entry count plus display lines for one domain's resolved value.
#[derive(Debug, Clone, Serialize)]
pub struct DomainReport {
    pub entries: usize,
    pub resolved: Vec<String>,
}

impl DomainReport {
    pub fn new(entries: usize, resolved: Vec<String>) -> Self {
        Self { entries, resolved }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IntensityReport {
    pub entries: usize,
    pub baseline: f32,
    pub level: f32,
}

/// Point-in-time view of every domain, for UI and CLI consumption.
#[derive(Debug, Clone, Serialize)]
pub struct StateReport {
    pub phase: SessionPhase,
    pub gear: DomainReport,
    pub meta: DomainReport,
    pub presets: DomainReport,
    pub statuses: DomainReport,
    pub profile: DomainReport,
    pub overlay: DomainReport,
    pub trait_flags: TraitFlags,
    pub trait_entries: usize,
    pub intensity: IntensityReport,
}
