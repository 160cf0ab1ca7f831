pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use errors::CoreError;
use models::quote::TableUpdate;
use models::settings::Settings;
use providers::coinmarketcap::CoinMarketCapApi;
use providers::traits::MarketApi;
use services::{
    quote_client::QuoteClient, refresh_loop::RefreshLoop,
    settings_controller::SettingsController,
};
use storage::config_store::ConfigStore;

/// Main entry point for the Mini Dash core library.
///
/// Owns the single [`ConfigStore`] and shares it between the refresh loop
/// (reader) and the settings controller (writer). A save notifies the
/// running loop so the next cycle starts right away.
#[must_use]
pub struct MiniDash {
    store: Arc<ConfigStore>,
    client: Arc<QuoteClient>,
    controller: Arc<SettingsController>,
    wake: Arc<Notify>,
}

impl std::fmt::Debug for MiniDash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiniDash")
            .field("config", &self.store.path())
            .field("provider", &self.client.provider_name())
            .field("save_status", &self.controller.status())
            .finish()
    }
}

impl MiniDash {
    /// Open (or create) the settings file and talk to the live CoinMarketCap API.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        Self::with_api(path, Box::new(CoinMarketCapApi::new()))
    }

    /// Same as [`open`](Self::open) but with a caller-supplied transport.
    pub fn with_api(path: impl Into<PathBuf>, api: Box<dyn MarketApi>) -> Result<Self, CoreError> {
        let store = Arc::new(ConfigStore::open_or_init(path)?);
        let wake = Arc::new(Notify::new());
        let controller = Arc::new(SettingsController::new(
            Arc::clone(&store),
            Arc::clone(&wake),
        ));
        Ok(Self {
            store,
            client: Arc::new(QuoteClient::new(api)),
            controller,
            wake,
        })
    }

    /// Replace the settings controller, e.g. to shorten its feedback pauses.
    pub fn map_controller(
        mut self,
        f: impl FnOnce(SettingsController) -> SettingsController,
    ) -> Self {
        let controller = SettingsController::new(Arc::clone(&self.store), Arc::clone(&self.wake));
        self.controller = Arc::new(f(controller));
        self
    }

    /// Current settings as stored on disk.
    pub fn settings(&self) -> Result<Settings, CoreError> {
        self.store.load()
    }

    pub fn config_store(&self) -> &Arc<ConfigStore> {
        &self.store
    }

    pub fn quote_client(&self) -> &Arc<QuoteClient> {
        &self.client
    }

    pub fn settings_controller(&self) -> &Arc<SettingsController> {
        &self.controller
    }

    /// Build a refresh loop that publishes into `sink`, without starting it.
    pub fn refresh_loop(&self, sink: mpsc::Sender<TableUpdate>) -> RefreshLoop {
        RefreshLoop::new(Arc::clone(&self.store), Arc::clone(&self.client), sink)
    }

    /// Start the refresh loop on the tokio runtime. It runs until `cancel` fires.
    pub fn spawn_refresh(
        &self,
        sink: mpsc::Sender<TableUpdate>,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        self.refresh_loop(sink).spawn(cancel, Arc::clone(&self.wake))
    }
}
