pub mod apply;
pub mod config;
pub mod domains;
pub mod handlers;
pub mod keys;
pub mod manager;
pub mod report;
pub mod sources;
pub mod store;

// Re-exports for convenience
pub use config::EngineConfig;
pub use keys::{CacheKey, NO_LAYER};
pub use manager::{Appliers, AuditAction, AuditRecord, SessionPhase, StateError, StateManager};
pub use report::StateReport;
pub use sources::{PrecedencePolicy, ServerSnapshot, SnapshotEntry, SourceItem};
