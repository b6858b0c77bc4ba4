//! Cache state manager: the single entry point for the source managers
//! and the connection lifecycle.
//!
//! Fans one logical add/remove event out to every affected domain handler
//! in parallel, owns the sync-on-connect and clear-on-disconnect paths,
//! and records provenance in a bounded audit trail.


use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use tether_types::ContributorId;

use crate::apply::{
    DryRunGear, DryRunMeta, DryRunOverlay, DryRunPreset, DryRunProfile, DryRunStatus, GearApplier,
    MetaApplier, OverlayApplier, PresetApplier, ProfileApplier, StatusApplier,
};
use crate::config::EngineConfig;
use crate::handlers::{
    GearHandler, IntensityHandler, MetaHandler, OverlayHandler, PresetHandler, ProfileHandler,
    StatusHandler, TraitHandler,
};
use crate::keys::CacheKey;
use crate::report::{DomainReport, IntensityReport, StateReport};
use crate::sources::{PrecedencePolicy, ServerSnapshot, SourceItem};

/// Per-session connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionPhase {
    Disconnected,
    Syncing,
    Synced,
}

#[derive(Debug, Error)]
pub enum StateError {
    /// A server sync is already running.
    #[error("sync already in flight")]
    SyncInFlight,

    /// The session is already synced; disconnect before syncing again.
    #[error("session already synced")]
    AlreadySynced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuditAction {
    Added,
    Removed,
    Synced,
    Cleared,
}

/// One provenance record: who changed what, and which domains it touched.
#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    pub at: DateTime<Utc>,
    pub action: AuditAction,
    pub key: Option<String>,
    pub contributor: Option<String>,
    pub domains: Vec<&'static str>,
}

#[derive(Debug)]
struct AuditLog {
    records: VecDeque<AuditRecord>,
    capacity: usize,
}

impl AuditLog {
    fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity.min(64)),
            capacity,
        }
    }

    fn push(&mut self, record: AuditRecord) {
        self.records.push_back(record);
        while self.records.len() > self.capacity {
            self.records.pop_front();
        }
    }
}

/// External subsystem bindings, one per externally-applied domain.
pub struct Appliers {
    pub gear: Box<dyn GearApplier>,
    pub meta: Box<dyn MetaApplier>,
    pub preset: Box<dyn PresetApplier>,
    pub status: Box<dyn StatusApplier>,
    pub profile: Box<dyn ProfileApplier>,
    pub overlay: Box<dyn OverlayApplier>,
}

impl Appliers {
    /// In-memory appliers that log every call; for the CLI harness and tests.
    pub fn dry_run() -> Self {
        Self {
            gear: Box::new(DryRunGear::new()),
            meta: Box::new(DryRunMeta::new()),
            preset: Box::new(DryRunPreset::new()),
            status: Box::new(DryRunStatus::new()),
            profile: Box::new(DryRunProfile::new()),
            overlay: Box::new(DryRunOverlay::new()),
        }
    }
}

/// Top-level orchestrator over the eight domain handlers.
pub struct StateManager {
    pub gear: GearHandler,
    pub meta: MetaHandler,
    pub preset: PresetHandler,
    pub status: StatusHandler,
    pub profile: ProfileHandler,
    pub overlay: OverlayHandler,
    pub traits: TraitHandler,
    pub intensity: Arc<IntensityHandler>,
    policy: PrecedencePolicy,
    phase: Mutex<SessionPhase>,
    audit: Mutex<AuditLog>,
}

impl StateManager {
    pub fn new(config: &EngineConfig, appliers: Appliers) -> Self {
        Self {
            gear: GearHandler::new(appliers.gear),
            meta: MetaHandler::new(appliers.meta),
            preset: PresetHandler::new(appliers.preset),
            status: StatusHandler::new(appliers.status),
            profile: ProfileHandler::new(appliers.profile),
            overlay: OverlayHandler::new(appliers.overlay, config.overlay_preference),
            traits: TraitHandler::new(),
            intensity: Arc::new(IntensityHandler::new()),
            policy: PrecedencePolicy::new(&config.precedence),
            phase: Mutex::new(SessionPhase::Disconnected),
            audit: Mutex::new(AuditLog::new(config.audit_capacity)),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        *self.phase.lock().unwrap()
    }

    pub fn policy(&self) -> &PrecedencePolicy {
        &self.policy
    }

    /// Derive the composite key for an item at a layer.
    fn key_for(&self, item: &SourceItem, layer: i8, contributor: ContributorId) -> CacheKey {
        CacheKey::new(
            self.policy.priority(item.source),
            layer,
            contributor,
            item.label.clone(),
        )
    }

    /// An item became active: insert its contributions and update every
    /// affected domain in parallel.
    pub async fn add_item(&self, item: &SourceItem, layer: i8, contributor: ContributorId) {
        let started = Instant::now();
        let key = self.key_for(item, layer, contributor);

        self.insert_contributions(&key, item);
        self.update_affected(item).await;

        self.record(
            AuditAction::Added,
            Some(&key),
            item.touched_domains(),
        );
        tracing::info!(
            "[CACHE] add {key} ({} domain(s)) took {}ms",
            item.touched_domains().len(),
            started.elapsed().as_millis()
        );
    }

    /// An item was removed/unlocked: drop its contributions and update
    /// every affected domain in parallel.
    pub async fn remove_item(&self, item: &SourceItem, layer: i8) {
        let started = Instant::now();
        let key = CacheKey::probe(self.policy.priority(item.source), layer);

        if !item.gear.is_empty() {
            self.gear.try_remove(&key);
        }
        if !item.meta.is_empty() {
            self.meta.try_remove(&key);
        }
        if !item.presets.is_empty() {
            self.preset.try_remove(&key);
        }
        if !item.statuses.is_empty() {
            self.status.try_remove(&key);
        }
        if item.profile.is_some() {
            self.profile.try_remove(&key);
        }
        if !item.overlays.is_empty() {
            self.overlay.try_remove(&key);
        }
        if !item.trait_flags.is_empty() {
            self.traits.try_remove(&key);
        }
        if item.intensity.is_some() {
            self.intensity.try_remove(&key);
        }

        self.update_affected(item).await;

        self.record(
            AuditAction::Removed,
            Some(&key),
            item.touched_domains(),
        );
        tracing::info!(
            "[CACHE] remove {key} took {}ms",
            started.elapsed().as_millis()
        );
    }

    /// On (re)connect: load every server-confirmed contribution, then run
    /// one parallel update pass over all domains. Keys already present are
    /// skipped, so replaying a snapshot is harmless.
    pub async fn sync_server_data(&self, snapshot: &ServerSnapshot) -> Result<(), StateError> {
        {
            let mut phase = self.phase.lock().unwrap();
            match *phase {
                SessionPhase::Disconnected => *phase = SessionPhase::Syncing,
                SessionPhase::Syncing => return Err(StateError::SyncInFlight),
                SessionPhase::Synced => return Err(StateError::AlreadySynced),
            }
        }

        let started = Instant::now();
        for entry in snapshot.entries() {
            let key = self.key_for(&entry.item, entry.layer, entry.contributor.clone());
            self.insert_contributions(&key, &entry.item);
        }

        self.update_all().await;

        *self.phase.lock().unwrap() = SessionPhase::Synced;
        self.record(AuditAction::Synced, None, Vec::new());
        tracing::info!(
            "[SYNC] {} item(s) synced in {}ms",
            snapshot.len(),
            started.elapsed().as_millis()
        );
        Ok(())
    }

    /// On disconnect/logout: empty every cache and revert the player's
    /// presentation in parallel.
    pub async fn clear_caches(&self) {
        let started = Instant::now();
        *self.phase.lock().unwrap() = SessionPhase::Disconnected;

        tokio::join!(
            self.gear.clear_and_apply(),
            self.meta.clear_and_apply(),
            self.preset.clear_and_apply(),
            self.status.clear_and_apply(),
            self.profile.clear_and_apply(),
            self.overlay.clear_and_apply(),
            async { self.traits.clear_and_apply() },
            async { self.intensity.clear_and_apply() },
        );

        self.record(AuditAction::Cleared, None, Vec::new());
        tracing::info!("[CACHE] clear took {}ms", started.elapsed().as_millis());
    }

    /// Start the intensity decay timer per the engine configuration.
    pub fn spawn_decay(&self, config: &EngineConfig) -> tokio::task::JoinHandle<()> {
        self.intensity.spawn_decay(
            std::time::Duration::from_millis(config.decay_tick_ms.max(1)),
            config.decay_per_second,
        )
    }

    /// Pure cache inserts for every domain the item touches.
    fn insert_contributions(&self, key: &CacheKey, item: &SourceItem) {
        if !item.gear.is_empty() {
            self.gear.try_add(key.clone(), item.gear.clone());
        }
        if !item.meta.is_empty() {
            self.meta.try_add(key.clone(), item.meta.clone());
        }
        if !item.presets.is_empty() {
            self.preset.try_add(key.clone(), item.presets.clone());
        }
        if !item.statuses.is_empty() {
            self.status.try_add(key.clone(), item.statuses.clone());
        }
        if let Some(profile) = &item.profile {
            self.profile.try_add(key.clone(), profile.clone());
        }
        if !item.overlays.is_empty() {
            self.overlay.try_add(key.clone(), item.overlays.clone());
        }
        if !item.trait_flags.is_empty() {
            self.traits.try_add(key.clone(), item.trait_flags);
        }
        if let Some(weight) = item.intensity {
            self.intensity.try_add(key.clone(), weight);
        }
    }

    /// Update the domains an item touches, in parallel. Domains do not
    /// block each other; each waits only on its own guard.
    async fn update_affected(&self, item: &SourceItem) {
        tokio::join!(
            async {
                if !item.gear.is_empty() {
                    self.gear.update().await;
                }
            },
            async {
                if !item.meta.is_empty() {
                    self.meta.update().await;
                }
            },
            async {
                if !item.presets.is_empty() {
                    self.preset.update().await;
                }
            },
            async {
                if !item.statuses.is_empty() {
                    self.status.update().await;
                }
            },
            async {
                if item.profile.is_some() {
                    self.profile.update().await;
                }
            },
            async {
                if !item.overlays.is_empty() {
                    self.overlay.update().await;
                }
            },
            async {
                if !item.trait_flags.is_empty() {
                    self.traits.update();
                }
            },
            async {
                if item.intensity.is_some() {
                    self.intensity.update();
                }
            },
        );
    }

    /// One update pass over every domain (sync and diagnostics path).
    pub async fn update_all(&self) {
        tokio::join!(
            self.gear.update(),
            self.meta.update(),
            self.preset.update(),
            self.status.update(),
            self.profile.update(),
            self.overlay.update(),
            async { self.traits.update() },
            async { self.intensity.update() },
        );
    }

    fn record(&self, action: AuditAction, key: Option<&CacheKey>, domains: Vec<&'static str>) {
        self.audit.lock().unwrap().push(AuditRecord {
            at: Utc::now(),
            action,
            key: key.map(|k| k.to_string()),
            contributor: key.map(|k| k.contributor().to_string()),
            domains,
        });
    }

    /// Most-recent-first audit records.
    pub fn audit_trail(&self) -> Vec<AuditRecord> {
        self.audit
            .lock()
            .unwrap()
            .records
            .iter()
            .rev()
            .cloned()
            .collect()
    }

    /// Snapshot of every domain's entry count and resolved value.
    pub fn report(&self) -> StateReport {
        StateReport {
            phase: self.phase(),
            gear: DomainReport::new(
                self.gear.entry_count(),
                self.gear
                    .resolved()
                    .iter()
                    .map(|(slot, piece)| format!("{slot}: {piece}"))
                    .collect(),
            ),
            meta: DomainReport::new(
                self.meta.entry_count(),
                self.meta
                    .resolved()
                    .iter()
                    .map(|(flag, state)| format!("{flag}: {state}"))
                    .collect(),
            ),
            presets: DomainReport::new(
                self.preset.entry_count(),
                self.preset
                    .resolved()
                    .iter()
                    .map(|(id, payload)| format!("{id} @ priority {}", payload.priority))
                    .collect(),
            ),
            statuses: DomainReport::new(
                self.status.entry_count(),
                self.status.resolved().iter().map(|id| id.to_string()).collect(),
            ),
            profile: DomainReport::new(
                self.profile.entry_count(),
                self.profile.resolved().iter().map(|p| p.to_string()).collect(),
            ),
            overlay: DomainReport::new(
                self.overlay.entry_count(),
                self.overlay.resolved().iter().map(|o| o.to_string()).collect(),
            ),
            trait_flags: self.traits.current(),
            trait_entries: self.traits.entry_count(),
            intensity: IntensityReport {
                entries: self.intensity.entry_count(),
                baseline: self.intensity.baseline(),
                level: self.intensity.level(),
            },
        }
    }
}
