//! Per-domain application guard.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, MutexGuard};

/// Mutual exclusion plus reentrancy suppression for one domain.
///
/// At most one external application is in flight per domain; a second
/// caller waits for the first to finish rather than being dropped. While
/// the guard is held, externally-sourced change notifications are ignored
/// (checked via [`ApplyGate::in_flight`]). Lowering the flag is deferred
/// by one scheduler tick after the guarded action completes, absorbing
/// ordering races against the subsystem's own event propagation.
#[derive(Debug, Default)]
pub(crate) struct ApplyGate {
    lock: Mutex<()>,
    applying: AtomicBool,
}

impl ApplyGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the domain guard and raise the suppression flag.
    pub async fn acquire(&self) -> MutexGuard<'_, ()> {
        let permit = self.lock.lock().await;
        self.applying.store(true, Ordering::SeqCst);
        permit
    }

    /// Lower the suppression flag one scheduler tick after the guarded
    /// action finished. Must be called while the permit from
    /// [`ApplyGate::acquire`] is still held.
    pub async fn release_deferred(&self) {
        tokio::task::yield_now().await;
        self.applying.store(false, Ordering::SeqCst);
    }

    /// Whether an application is currently in flight (or was, within the
    /// deferred-release window).
    pub fn in_flight(&self) -> bool {
        self.applying.load(Ordering::SeqCst)
    }
}
