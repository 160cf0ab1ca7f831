use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::errors::CoreError;
use crate::models::quote::{FetchFailure, FetchOutcome, TableUpdate};
use crate::models::settings::{Settings, DEFAULT_HOT_RELOAD_SECS};
use crate::storage::config_store::ConfigStore;

use super::quote_client::QuoteClient;

/// Background fetch-and-publish cycle.
///
/// Each cycle re-reads the settings file, so key, portfolio and interval
/// edits apply without a restart. Rows never go to the UI directly: every
/// cycle produces one [`TableUpdate`] on an mpsc channel, and the display
/// side applies it on its own thread.
///
/// Fetch failures, and a settings file that cannot be read, only change
/// what is displayed; the loop keeps going until it is cancelled or the
/// receiving side hangs up.
pub struct RefreshLoop {
    store: Arc<ConfigStore>,
    client: Arc<QuoteClient>,
    sink: mpsc::Sender<TableUpdate>,
}

impl RefreshLoop {
    pub fn new(
        store: Arc<ConfigStore>,
        client: Arc<QuoteClient>,
        sink: mpsc::Sender<TableUpdate>,
    ) -> Self {
        Self {
            store,
            client,
            sink,
        }
    }

    /// Run one cycle without publishing: read settings, fetch, build rows.
    pub async fn tick(&self) -> Result<TableUpdate, CoreError> {
        let settings = self.store.load()?;
        Ok(self.fetch(&settings).await)
    }

    async fn fetch(&self, settings: &Settings) -> TableUpdate {
        let outcome = self
            .client
            .fetch_quotes(&settings.api_key, &settings.portfolio_id)
            .await;
        TableUpdate::from_outcome(&outcome)
    }

    /// Loop until `cancel` fires or the display drops its receiver.
    ///
    /// Between cycles the loop sleeps for the configured interval, or less
    /// if `wake` is notified (a settings save does this).
    pub async fn run(self, cancel: CancellationToken, wake: Arc<Notify>) {
        info!(provider = self.client.provider_name(), "refresh loop started");

        while !cancel.is_cancelled() {
            let (update, interval) = tokio::select! {
                _ = cancel.cancelled() => break,
                cycle = self.cycle() => cycle,
            };

            debug!(
                rows = update.rows.len(),
                ok = update.failure.is_none(),
                "publishing table update"
            );
            let sent = tokio::select! {
                _ = cancel.cancelled() => break,
                sent = self.sink.send(update) => sent,
            };
            if sent.is_err() {
                info!("display closed, stopping refresh loop");
                break;
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
                _ = wake.notified() => debug!("settings changed, refreshing early"),
            }
        }

        info!("refresh loop stopped");
    }

    /// Start [`run`](Self::run) on the tokio runtime.
    pub fn spawn(self, cancel: CancellationToken, wake: Arc<Notify>) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel, wake))
    }

    // An unreadable settings file still produces an update: the sentinel row
    // with the reason, retried after the default interval.
    async fn cycle(&self) -> (TableUpdate, Duration) {
        match self.store.load() {
            Ok(settings) => {
                let update = self.fetch(&settings).await;
                (update, settings.refresh_interval())
            }
            Err(e) => {
                error!(error = %e, "could not read settings for refresh");
                let reason = FetchFailure::ConfigUnreadable(e.to_string());
                let outcome = FetchOutcome::Failure(reason);
                (
                    TableUpdate::from_outcome(&outcome),
                    Duration::from_secs(DEFAULT_HOT_RELOAD_SECS),
                )
            }
        }
    }
}
