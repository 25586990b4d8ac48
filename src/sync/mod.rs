//! Price server protocol: wire models, HTTP client and the sync orchestrator.

pub mod client;
pub mod models;
pub mod orchestrator;

pub use client::{SyncBackend, SyncClient};
pub use models::{PriceObservation, Product, ProgressEntry, ResponseStatus, Snapshot, SyncResult};
pub use orchestrator::{SyncError, SyncOrchestrator, SyncOutcome};
