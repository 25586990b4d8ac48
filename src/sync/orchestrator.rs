//! Drives a sync run: resets the status board, queries the price server, applies
//! progress and replaces the snapshot.

use super::client::SyncBackend;
use super::models::{Snapshot, SyncResult};
use crate::aggregate::AggregateError;
use crate::config::DEFAULT_QUERY;
use crate::tracker::{RetailerStatusTracker, StatusRow, Summary};
use crate::view::{self, CategoryFilter, ViewModel};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Shown when the price server cannot be reached or answers garbage.
pub const TRANSPORT_FAILURE_MESSAGE: &str = "Error: the price server is not responding.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("a sync is already in progress")]
    InFlight,
}

/// How a sync run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The snapshot was replaced.
    Completed { products: usize, prices: usize },
    /// The server answered but reported a failed scrape.
    Rejected { message: String },
    /// No usable answer from the server.
    TransportFailed,
}

impl SyncOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, SyncOutcome::Completed { .. })
    }
}

#[derive(Debug, Default)]
struct SyncState {
    tracker: RetailerStatusTracker,
    snapshot: Snapshot,
    status_line: String,
    /// Term of the most recent attempt, successful or not
    last_attempt: Option<String>,
}

/// Clears the busy flag however the run exits.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owns the status board and the current snapshot; the only writer of either.
///
/// At most one sync runs at a time. A second [`start_sync`](Self::start_sync)
/// while one is pending is rejected with [`SyncError::InFlight`] and leaves all
/// state alone.
pub struct SyncOrchestrator<B> {
    backend: B,
    default_query: String,
    state: Mutex<SyncState>,
    busy: AtomicBool,
}

impl<B: SyncBackend> SyncOrchestrator<B> {
    pub fn new(backend: B) -> Self {
        Self::with_default_query(backend, DEFAULT_QUERY)
    }

    pub fn with_default_query(backend: B, default_query: impl Into<String>) -> Self {
        Self {
            backend,
            default_query: default_query.into(),
            state: Mutex::new(SyncState::default()),
            busy: AtomicBool::new(false),
        }
    }

    /// Runs one sync for `query`, or the default term if it is blank.
    pub async fn start_sync(&self, query: &str) -> Result<SyncOutcome, SyncError> {
        if self.busy.swap(true, Ordering::AcqRel) {
            warn!("Sync requested while another is running; ignoring");
            return Err(SyncError::InFlight);
        }
        let _busy = BusyGuard(&self.busy);

        let term = match query.trim() {
            "" => self.default_query.clone(),
            q => q.to_string(),
        };

        {
            let mut state = self.state.lock().await;
            state.tracker.reset();
            state.status_line = format!("Searching \"{}\" in real time...", term);
            state.last_attempt = Some(term.clone());
        }

        let response = self.backend.sync(&term).await;

        let mut state = self.state.lock().await;
        match response {
            Ok(result) => Ok(Self::apply_result(&mut state, result, term)),
            Err(e) => {
                warn!("Sync failed: {:#}", e);
                state.status_line = TRANSPORT_FAILURE_MESSAGE.to_string();
                Ok(SyncOutcome::TransportFailed)
            }
        }
    }

    fn apply_result(state: &mut SyncState, result: SyncResult, term: String) -> SyncOutcome {
        if !result.progress.is_empty() {
            for entry in &result.progress {
                state.tracker.apply(entry);
            }
            let summary = RetailerStatusTracker::summarize(&result.progress);
            debug!(
                "Retailers: {} ok, {} failed, {} skipped",
                summary.success, summary.error, summary.skipped
            );
            state.tracker.set_summary(summary);
        }

        if !result.is_success() {
            let message = result
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| "Unknown".to_string());
            warn!("Price server reported an error: {}", message);
            state.status_line = format!("Error: {}", message);
            return SyncOutcome::Rejected { message };
        }

        let (products, dropped): (Vec<_>, Vec<_>) =
            result.results.into_iter().partition(|p| !p.prices.is_empty());
        if !dropped.is_empty() {
            warn!("Dropping {} products without prices", dropped.len());
        }

        let query = if result.query.trim().is_empty() { term } else { result.query };
        let snapshot = Snapshot { products, query, last_update: result.timestamp };

        let product_count = snapshot.products.len();
        let price_count = snapshot.total_prices();
        info!("Snapshot replaced: {} products, {} prices", product_count, price_count);

        state.snapshot = snapshot;
        state.status_line = format!(
            "✓ Search complete: {} unique products, {} prices found",
            product_count, price_count
        );

        SyncOutcome::Completed { products: product_count, prices: price_count }
    }

    /// Returns true while a sync is running (the trigger is disabled).
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.state.lock().await.snapshot.clone()
    }

    pub async fn status_line(&self) -> String {
        self.state.lock().await.status_line.clone()
    }

    pub async fn summary(&self) -> Option<Summary> {
        self.state.lock().await.tracker.summary()
    }

    pub async fn board(&self) -> Vec<StatusRow> {
        self.state.lock().await.tracker.board()
    }

    /// Categories of the current snapshot, in first-seen order.
    pub async fn categories(&self) -> Vec<String> {
        let state = self.state.lock().await;
        view::categories(&state.snapshot).into_iter().map(str::to_string).collect()
    }

    /// "Last updated" banner, absent until a sync has succeeded.
    pub async fn last_update_banner(&self) -> Option<String> {
        let state = self.state.lock().await;
        let snapshot = &state.snapshot;
        if snapshot.last_update.is_empty() {
            return None;
        }
        Some(format!("Live search for \"{}\": {}", snapshot.query, snapshot.last_update))
    }

    /// Renders the current snapshot through `filter`.
    ///
    /// An empty snapshot is reported against the last attempted term.
    pub async fn view(&self, filter: &CategoryFilter) -> Result<ViewModel, AggregateError> {
        let state = self.state.lock().await;
        match (view::render(&state.snapshot, filter)?, &state.last_attempt) {
            (ViewModel::NoResults { .. }, Some(term)) => {
                Ok(ViewModel::NoResults { query: term.clone() })
            }
            (view, _) => Ok(view),
        }
    }
}
