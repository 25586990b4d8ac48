//! Sync command implementation.

use crate::config::Config;
use crate::format::{Formatter, SyncReport};
use crate::sync::{SyncBackend, SyncClient, SyncOrchestrator, SyncOutcome};
use crate::view::CategoryFilter;
use anyhow::{Context, Result};
use tracing::{debug, info};

/// Runs one sync and renders the resulting report.
pub struct SyncCommand {
    config: Config,
}

impl SyncCommand {
    /// Creates a new sync command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Executes the sync and returns formatted output.
    pub async fn execute(&self, query: &str) -> Result<String> {
        let client = SyncClient::new(&self.config).context("Failed to create HTTP client")?;
        debug!("Price server: {}", client.base_url());

        self.execute_with_backend(client, query).await
    }

    /// Executes the sync with a provided backend (for testing).
    pub async fn execute_with_backend(&self, backend: impl SyncBackend, query: &str) -> Result<String> {
        let orchestrator = SyncOrchestrator::with_default_query(backend, &self.config.default_query);

        let outcome = orchestrator.start_sync(query).await?;
        match &outcome {
            SyncOutcome::Completed { products, prices } => {
                info!("Found {} products with {} prices", products, prices)
            }
            SyncOutcome::Rejected { message } => info!("Sync rejected: {}", message),
            SyncOutcome::TransportFailed => info!("Sync failed to reach the price server"),
        }

        let report = self.report(&orchestrator, &self.config.category).await?;

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_report(&report))
    }

    async fn report<B: SyncBackend>(
        &self,
        orchestrator: &SyncOrchestrator<B>,
        filter: &CategoryFilter,
    ) -> Result<SyncReport> {
        let view = orchestrator.view(filter).await.context("Failed to render products")?;

        Ok(SyncReport {
            status: orchestrator.status_line().await,
            last_update: orchestrator.last_update_banner().await,
            summary: orchestrator.summary().await,
            retailers: orchestrator.board().await,
            categories: orchestrator.categories().await,
            view,
        })
    }
}
