//! Shared harness state: the engine wired to dry-run subsystems.

use std::sync::Arc;

use tether_core::apply::{
    DryRunGear, DryRunMeta, DryRunOverlay, DryRunPreset, DryRunProfile, DryRunStatus,
};
use tether_core::{Appliers, EngineConfig, StateManager};

pub struct HarnessState {
    pub engine: Arc<StateManager>,
    pub config: EngineConfig,
    /// Handles onto the same dry-run subsystems the engine applies to,
    /// kept so the `tamper` command can fake out-of-band changes.
    pub gear: Arc<DryRunGear>,
    pub meta: Arc<DryRunMeta>,
    pub preset: Arc<DryRunPreset>,
    pub status: Arc<DryRunStatus>,
    pub profile: Arc<DryRunProfile>,
    pub overlay: Arc<DryRunOverlay>,
    pub decay_task: Option<tokio::task::JoinHandle<()>>,
}

impl HarnessState {
    pub fn new(config: EngineConfig) -> Self {
        let gear = Arc::new(DryRunGear::new());
        let meta = Arc::new(DryRunMeta::new());
        let preset = Arc::new(DryRunPreset::new());
        let status = Arc::new(DryRunStatus::new());
        let profile = Arc::new(DryRunProfile::new());
        let overlay = Arc::new(DryRunOverlay::new());

        let appliers = Appliers {
            gear: Box::new(Arc::clone(&gear)),
            meta: Box::new(Arc::clone(&meta)),
            preset: Box::new(Arc::clone(&preset)),
            status: Box::new(Arc::clone(&status)),
            profile: Box::new(Arc::clone(&profile)),
            overlay: Box::new(Arc::clone(&overlay)),
        };
        let engine = Arc::new(StateManager::new(&config, appliers));

        Self {
            engine,
            config,
            gear,
            meta,
            preset,
            status,
            profile,
            overlay,
            decay_task: None,
        }
    }

    /// Start the intensity decay loop (idempotent).
    pub fn ensure_decay_task(&mut self) {
        if self.decay_task.is_none() {
            self.decay_task = Some(self.engine.spawn_decay(&self.config));
        }
    }
}

impl Drop for HarnessState {
    fn drop(&mut self) {
        if let Some(task) = self.decay_task.take() {
            task.abort();
        }
    }
}
