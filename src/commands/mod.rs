//! CLI command implementations.

pub mod retailers;
pub mod sync;

pub use sync::SyncCommand;
