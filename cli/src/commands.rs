//! REPL command implementations.

use std::sync::Arc;

use tokio::sync::RwLock;

use tether_core::EngineConfig;
use tether_types::ContributorId;

use crate::catalog;
use crate::state::HarnessState;

pub async fn connect(state: Arc<RwLock<HarnessState>>) -> Result<(), String> {
    let mut state = state.write().await;
    state.ensure_decay_task();
    let snapshot = catalog::demo_snapshot();
    state
        .engine
        .sync_server_data(&snapshot)
        .await
        .map_err(|e| format!("error: {e}\n"))?;
    println!("connected, {} item(s) synced", snapshot.len());
    Ok(())
}

pub async fn disconnect(state: Arc<RwLock<HarnessState>>) -> Result<(), String> {
    let state = state.read().await;
    state.engine.clear_caches().await;
    println!("disconnected, presentation reverted");
    Ok(())
}

pub async fn add_item(
    state: Arc<RwLock<HarnessState>>,
    name: &str,
    layer: i8,
    by: Option<&str>,
) -> Result<(), String> {
    let item = catalog::find(name)
        .ok_or_else(|| format!("error: unknown item '{name}' (see `items`)\n"))?;
    let contributor = by
        .map(ContributorId::new)
        .unwrap_or_else(ContributorId::local);

    let state = state.read().await;
    state.engine.add_item(&item, layer, contributor).await;
    println!("added {name} at layer {layer}");
    Ok(())
}

pub async fn remove_item(
    state: Arc<RwLock<HarnessState>>,
    name: &str,
    layer: i8,
) -> Result<(), String> {
    let item = catalog::find(name)
        .ok_or_else(|| format!("error: unknown item '{name}' (see `items`)\n"))?;

    let state = state.read().await;
    state.engine.remove_item(&item, layer).await;
    println!("removed {name} at layer {layer}");
    Ok(())
}

/// Fake an out-of-band change in one subsystem, then deliver the change
/// notification the way the real plugin would.
pub async fn tamper(state: Arc<RwLock<HarnessState>>, target: &str) -> Result<(), String> {
    let state = state.read().await;
    match target {
        "gear" => {
            for slot in state.engine.gear.resolved().keys() {
                state.gear.tamper(*slot, None);
            }
            state.engine.gear.reconcile().await;
        }
        "status" => {
            for id in state.engine.status.resolved() {
                state.status.tamper_remove(id);
            }
            state.engine.status.reconcile().await;
        }
        "profile" => {
            state.profile.tamper(None);
            state.engine.profile.reconcile(None).await;
        }
        "overlay" => {
            state.overlay.tamper_clear();
            state.engine.overlay.reconcile(None).await;
        }
        other => {
            return Err(format!(
                "error: unknown tamper target '{other}' (gear, status, profile, overlay)\n"
            ));
        }
    }
    println!("tampered with {target}; engine reconciled");
    Ok(())
}

pub async fn show_state(state: Arc<RwLock<HarnessState>>) -> Result<(), String> {
    let state = state.read().await;
    let report = state.engine.report();
    let json = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
    println!("{json}");
    println!("-- external (dry-run) --");
    println!("equipment: {} slot(s) forced", state.gear.snapshot().len());
    println!("statuses:  {} active", state.status.snapshot().len());
    match state.profile.snapshot() {
        Some(profile) => println!("profile:   {profile}"),
        None => println!("profile:   none"),
    }
    match state.overlay.snapshot() {
        Some(overlay) => println!("overlay:   {overlay}"),
        None => println!("overlay:   none"),
    }
    Ok(())
}

pub async fn show_audit(state: Arc<RwLock<HarnessState>>) -> Result<(), String> {
    let state = state.read().await;
    let trail = state.engine.audit_trail();
    if trail.is_empty() {
        println!("audit trail empty");
        return Ok(());
    }
    for record in trail {
        println!(
            "{} {:?} {} [{}]",
            record.at.format("%H:%M:%S"),
            record.action,
            record.key.as_deref().unwrap_or("-"),
            record.domains.join(", ")
        );
    }
    Ok(())
}

pub fn list_items() {
    for name in catalog::NAMES {
        println!("{name}");
    }
}

pub async fn show_settings(state: Arc<RwLock<HarnessState>>) -> Result<(), String> {
    let state = state.read().await;
    println!("precedence:         {:?}", state.config.precedence);
    println!("overlay preference: {:?}", state.config.overlay_preference);
    println!(
        "intensity decay:    {}/s every {}ms",
        state.config.decay_per_second, state.config.decay_tick_ms
    );
    match EngineConfig::path() {
        Some(path) => println!("config file:        {}", path.display()),
        None => println!("config file:        (no config directory)"),
    }
    Ok(())
}

pub fn exit() {
    println!("bye");
}
