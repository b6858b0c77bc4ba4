//! Intensity-accumulator handler.
//!
//! Pure in-process domain with its own decay timer. Contributions resolve
//! to a baseline; the displayed level jumps up to the baseline immediately
//! when it rises and decays toward it over time when it falls. Consumed by
//! UI/gameplay evaluators, never pushed externally.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::domains::{IntensityResolver, LayerCache};
use crate::keys::CacheKey;

pub struct IntensityHandler {
    cache: Mutex<LayerCache<IntensityResolver>>,
    /// Displayed level; decays toward the resolved baseline.
    level: Mutex<f32>,
}

impl Default for IntensityHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl IntensityHandler {
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(LayerCache::new(IntensityResolver)),
            level: Mutex::new(0.0),
        }
    }

    pub fn try_add(&self, key: CacheKey, weight: f32) -> bool {
        self.cache.lock().unwrap().try_add(key, weight)
    }

    pub fn try_remove(&self, key: &CacheKey) -> bool {
        self.cache.lock().unwrap().try_remove(key)
    }

    /// Recompute the baseline; the level rises to it immediately but only
    /// ever falls through decay ticks.
    pub fn update(&self) -> bool {
        let changed = {
            let mut cache = self.cache.lock().unwrap();
            cache.recompute_final()
        };
        let baseline = self.baseline();
        let mut level = self.level.lock().unwrap();
        if baseline > *level {
            *level = baseline;
        }
        changed
    }

    pub fn clear_and_apply(&self) {
        {
            let mut cache = self.cache.lock().unwrap();
            cache.clear();
            cache.recompute_final();
        }
        // Full clear drops the level outright; there is nothing left to
        // decay from once the session ends.
        *self.level.lock().unwrap() = 0.0;
    }

    /// One decay step: move the level toward the baseline by
    /// `decay_per_second * dt`, never overshooting.
    pub fn tick(&self, dt: Duration, decay_per_second: f32) {
        let baseline = self.baseline();
        let mut level = self.level.lock().unwrap();
        if *level > baseline {
            let step = decay_per_second * dt.as_secs_f32();
            *level = (*level - step).max(baseline);
        }
    }

    /// Drive [`IntensityHandler::tick`] on an interval until the handle is
    /// aborted.
    pub fn spawn_decay(
        self: &Arc<Self>,
        period: Duration,
        decay_per_second: f32,
    ) -> tokio::task::JoinHandle<()> {
        let handler = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                handler.tick(period, decay_per_second);
            }
        })
    }

    /// The resolved baseline (pure function of the entry set).
    pub fn baseline(&self) -> f32 {
        *self.cache.lock().unwrap().final_value()
    }

    /// The current displayed level.
    pub fn level(&self) -> f32 {
        *self.level.lock().unwrap()
    }

    pub fn entry_count(&self) -> usize {
        self.cache.lock().unwrap().len()
    }
}
