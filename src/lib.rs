//! price-tracker - Grocery price comparison across Colombian retailers
//!
//! Queries the price server for a product search, tracks the per-retailer
//! scrape progress and reduces each product to its best price.

pub mod aggregate;
pub mod commands;
pub mod config;
pub mod format;
pub mod retailers;
pub mod sync;
pub mod tracker;
pub mod view;

pub use aggregate::{best_price, with_best_flag, AggregateError, RankedObservation};
pub use config::Config;
pub use retailers::{Retailer, RetailerStatus};
pub use sync::{PriceObservation, Product, ProgressEntry, Snapshot, SyncOrchestrator, SyncResult};
pub use tracker::{RetailerStatusTracker, Summary};
pub use view::{render, CategoryFilter, ViewModel};
