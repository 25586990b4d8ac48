//! Per-retailer status board for a sync run.

use crate::retailers::{Retailer, RetailerStatus};
use crate::sync::models::ProgressEntry;
use serde::Serialize;
use tracing::{debug, trace};

/// Tally of retailer outcomes reported by one sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Size of the retailer catalog, not the number of entries
    pub total: usize,
    pub success: usize,
    pub error: usize,
    pub skipped: usize,
}

/// One line of the status board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusRow {
    pub retailer: Retailer,
    pub status: RetailerStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct Slot {
    status: RetailerStatus,
    message: Option<String>,
}

/// Tracks the latest status of every catalog retailer.
///
/// Statuses are observational only: a retailer in `Error` has no effect on how
/// the other retailers or the products are processed.
#[derive(Debug, Clone)]
pub struct RetailerStatusTracker {
    slots: Vec<Slot>,
    summary: Option<Summary>,
}

impl RetailerStatusTracker {
    /// Creates a tracker with every retailer pending.
    pub fn new() -> Self {
        Self { slots: vec![Slot::default(); Retailer::all().len()], summary: None }
    }

    /// Puts every retailer back to pending and forgets messages and the summary.
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.status = RetailerStatus::Pending;
            slot.message = None;
        }
        self.summary = None;
        trace!("Retailer statuses reset");
    }

    /// Applies a progress entry. Entries for retailers outside the catalog are ignored.
    ///
    /// Returns the retailer that was updated, if any.
    pub fn apply(&mut self, entry: &ProgressEntry) -> Option<Retailer> {
        let Some(retailer) = Retailer::lookup(&entry.retailer) else {
            debug!("Ignoring progress for unknown retailer: {}", entry.retailer);
            return None;
        };

        let slot = &mut self.slots[retailer.index()];
        slot.status = entry.status;
        if let Some(message) = entry.message.as_deref().filter(|m| !m.is_empty()) {
            slot.message = Some(message.to_string());
        }

        debug!("{} -> {}", retailer, entry.status);
        Some(retailer)
    }

    /// Counts outcomes using the statuses carried by the entries themselves.
    pub fn summarize(entries: &[ProgressEntry]) -> Summary {
        let mut summary = Summary { total: Retailer::all().len(), ..Summary::default() };

        for entry in entries {
            match entry.status {
                RetailerStatus::Success => summary.success += 1,
                RetailerStatus::Error => summary.error += 1,
                RetailerStatus::Skipped => summary.skipped += 1,
                RetailerStatus::Pending | RetailerStatus::Starting => {}
            }
        }

        summary
    }

    pub fn status(&self, retailer: Retailer) -> RetailerStatus {
        self.slots[retailer.index()].status
    }

    pub fn message(&self, retailer: Retailer) -> Option<&str> {
        self.slots[retailer.index()].message.as_deref()
    }

    pub fn summary(&self) -> Option<Summary> {
        self.summary
    }

    pub fn set_summary(&mut self, summary: Summary) {
        self.summary = Some(summary);
    }

    /// Returns the board in catalog order.
    pub fn board(&self) -> Vec<StatusRow> {
        Retailer::all()
            .iter()
            .map(|&retailer| {
                let slot = &self.slots[retailer.index()];
                StatusRow { retailer, status: slot.status, message: slot.message.clone() }
            })
            .collect()
    }
}

impl Default for RetailerStatusTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(retailer: &str, status: RetailerStatus) -> ProgressEntry {
        ProgressEntry::new(retailer, status)
    }

    #[test]
    fn test_new_tracker_is_pending() {
        let tracker = RetailerStatusTracker::new();
        for r in Retailer::all() {
            assert_eq!(tracker.status(*r), RetailerStatus::Pending);
            assert!(tracker.message(*r).is_none());
        }
        assert!(tracker.summary().is_none());
    }

    #[test]
    fn test_apply_sets_status_and_message() {
        let mut tracker = RetailerStatusTracker::new();
        let updated = tracker.apply(
            &entry("Carulla", RetailerStatus::Error).with_message("HTTP 403"),
        );

        assert_eq!(updated, Some(Retailer::Carulla));
        assert_eq!(tracker.status(Retailer::Carulla), RetailerStatus::Error);
        assert_eq!(tracker.message(Retailer::Carulla), Some("HTTP 403"));
        assert_eq!(tracker.status(Retailer::Exito), RetailerStatus::Pending);
    }

    #[test]
    fn test_latest_entry_wins() {
        let mut tracker = RetailerStatusTracker::new();
        tracker.reset();
        tracker.apply(&entry("Éxito", RetailerStatus::Success).with_message("first"));
        tracker.apply(&entry("Éxito", RetailerStatus::Success).with_message("second"));

        assert_eq!(tracker.status(Retailer::Exito), RetailerStatus::Success);
        assert_eq!(tracker.message(Retailer::Exito), Some("second"));
    }

    #[test]
    fn test_apply_without_message_keeps_previous() {
        let mut tracker = RetailerStatusTracker::new();
        tracker.apply(&entry("D1", RetailerStatus::Starting).with_message("Consultando D1..."));
        tracker.apply(&entry("D1", RetailerStatus::Success));

        assert_eq!(tracker.status(Retailer::D1), RetailerStatus::Success);
        assert_eq!(tracker.message(Retailer::D1), Some("Consultando D1..."));
    }

    #[test]
    fn test_unknown_retailer_is_ignored() {
        let mut tracker = RetailerStatusTracker::new();
        let before = tracker.board();

        let updated = tracker.apply(&entry("Carrefour", RetailerStatus::Error).with_message("x"));

        assert!(updated.is_none());
        assert_eq!(tracker.board(), before);
    }

    #[test]
    fn test_unknown_retailer_does_not_block_others() {
        let mut tracker = RetailerStatusTracker::new();
        let entries = vec![
            entry("Makro", RetailerStatus::Success),
            entry("Tiendas Nowhere", RetailerStatus::Error),
            entry("Alkosto", RetailerStatus::Error),
        ];
        for e in &entries {
            tracker.apply(e);
        }

        assert_eq!(tracker.status(Retailer::Makro), RetailerStatus::Success);
        assert_eq!(tracker.status(Retailer::Alkosto), RetailerStatus::Error);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut tracker = RetailerStatusTracker::new();
        tracker.apply(&entry("Jumbo", RetailerStatus::Error).with_message("timeout"));
        tracker.set_summary(RetailerStatusTracker::summarize(&[]));

        tracker.reset();

        assert_eq!(tracker.status(Retailer::Jumbo), RetailerStatus::Pending);
        assert!(tracker.message(Retailer::Jumbo).is_none());
        assert!(tracker.summary().is_none());
    }

    #[test]
    fn test_summarize_empty() {
        let summary = RetailerStatusTracker::summarize(&[]);
        assert_eq!(summary, Summary { total: 10, success: 0, error: 0, skipped: 0 });
    }

    #[test]
    fn test_summarize_counts_entry_statuses() {
        let entries = vec![
            entry("Olímpica", RetailerStatus::Starting),
            entry("Olímpica", RetailerStatus::Success),
            entry("Éxito", RetailerStatus::Success),
            entry("Metro", RetailerStatus::Error),
            entry("Ara", RetailerStatus::Skipped),
            entry("PriceSmart", RetailerStatus::Skipped),
            entry("Unknown", RetailerStatus::Error),
        ];

        let summary = RetailerStatusTracker::summarize(&entries);
        assert_eq!(summary.total, 10);
        assert_eq!(summary.success, 2);
        assert_eq!(summary.error, 2);
        assert_eq!(summary.skipped, 2);
    }

    #[test]
    fn test_summarize_total_independent_of_entry_count() {
        let many: Vec<ProgressEntry> =
            (0..25).map(|_| entry("D1", RetailerStatus::Success)).collect();
        assert_eq!(RetailerStatusTracker::summarize(&many).total, 10);
    }

    #[test]
    fn test_board_catalog_order() {
        let mut tracker = RetailerStatusTracker::new();
        tracker.apply(&entry("PriceSmart", RetailerStatus::Skipped).with_message("Requiere membresía"));

        let board = tracker.board();
        assert_eq!(board.len(), 10);
        assert_eq!(board[0].retailer, Retailer::Olimpica);
        assert_eq!(board[9].retailer, Retailer::PriceSmart);
        assert_eq!(board[9].status, RetailerStatus::Skipped);
        assert_eq!(board[9].message.as_deref(), Some("Requiere membresía"));
    }
}
