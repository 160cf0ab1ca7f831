use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{watch, Notify};
use tracing::{debug, error, info, warn};

use crate::errors::CoreError;
use crate::models::settings::{
    SettingKey, Settings, API_KEY_PLACEHOLDER, DEFAULT_HOT_RELOAD_SECS,
};
use crate::storage::config_store::ConfigStore;

/// How long the save affordance lingers in `Busy` and `Saved`.
pub const FEEDBACK_PAUSE: Duration = Duration::from_millis(500);

/// State of the save affordance shown next to the settings form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    Ready,
    Busy,
    Saved,
    /// The last save failed. New saves are refused until acknowledged.
    Failed(String),
}

impl SaveStatus {
    pub fn accepts_requests(&self) -> bool {
        !matches!(self, SaveStatus::Failed(_))
    }
}

/// Working copy of the settings form fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsForm {
    pub theme: String,
    pub api_key: String,
    pub portfolio_id: String,
    pub hot_reload: u64,
}

impl SettingsForm {
    /// Seed the form from stored settings. An unset key shows the placeholder.
    pub fn from_settings(settings: &Settings) -> Self {
        let api_key = if settings.has_api_key() {
            settings.api_key.clone()
        } else {
            API_KEY_PLACEHOLDER.to_string()
        };
        Self {
            theme: settings.theme.to_string(),
            api_key,
            portfolio_id: settings.portfolio_id.clone(),
            hot_reload: settings.hot_reload.unwrap_or(DEFAULT_HOT_RELOAD_SECS),
        }
    }

    fn edits(&self) -> Vec<(SettingKey, String)> {
        vec![
            (SettingKey::ColorTheme, self.theme.clone()),
            (SettingKey::ApiKey, self.api_key.clone()),
            (SettingKey::PortfolioId, self.portfolio_id.clone()),
            (SettingKey::HotReload, self.hot_reload.to_string()),
        ]
    }
}

/// Applies settings form edits to the [`ConfigStore`].
///
/// Saves go through a single slot: the newest requested form replaces any
/// queued one, and one worker task drains the slot, so rapid repeated saves
/// coalesce instead of racing each other on the file.
pub struct SettingsController {
    store: Arc<ConfigStore>,
    wake: Arc<Notify>,
    status: watch::Sender<SaveStatus>,
    pending: Mutex<Option<SettingsForm>>,
    in_flight: AtomicBool,
    pause: Duration,
}

impl SettingsController {
    /// `wake` is notified after every successful save so the refresh loop
    /// picks up the new values without waiting out its interval.
    pub fn new(store: Arc<ConfigStore>, wake: Arc<Notify>) -> Self {
        let (status, _) = watch::channel(SaveStatus::Ready);
        Self {
            store,
            wake,
            status,
            pending: Mutex::new(None),
            in_flight: AtomicBool::new(false),
            pause: FEEDBACK_PAUSE,
        }
    }

    /// Override the feedback pause (tests use `Duration::ZERO`).
    #[must_use]
    pub fn with_feedback_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Current form contents as stored on disk.
    pub fn load_form(&self) -> Result<SettingsForm, CoreError> {
        Ok(SettingsForm::from_settings(&self.store.load()?))
    }

    pub fn status(&self) -> SaveStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.status.subscribe()
    }

    /// Write all four form fields in one transaction, walking the status
    /// through `Busy → Saved → Ready`. On failure the status is left at
    /// `Failed` until [`acknowledge_failure`](Self::acknowledge_failure).
    pub async fn apply_edits(&self, form: SettingsForm) -> Result<(), CoreError> {
        self.status.send_replace(SaveStatus::Busy);
        tokio::time::sleep(self.pause).await;

        match self.store.apply(&form.edits()) {
            Ok(saved) => {
                info!(
                    theme = %saved.theme,
                    portfolio_id = %saved.portfolio_id,
                    interval_secs = saved.refresh_interval().as_secs(),
                    "settings saved"
                );
                self.wake.notify_one();
                self.status.send_replace(SaveStatus::Saved);
                tokio::time::sleep(self.pause).await;
                self.status.send_replace(SaveStatus::Ready);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "failed to save settings");
                self.status.send_replace(SaveStatus::Failed(e.to_string()));
                Err(CoreError::SaveFailed(e.to_string()))
            }
        }
    }

    /// Queue `form` for saving in the background.
    ///
    /// Returns `false` (and drops the form) while a previous failure has not
    /// been acknowledged. A `true` only means the form was queued: if the save
    /// running ahead of it fails, the queued form is discarded with a warning
    /// and the status moves to `Failed`, which callers observe via
    /// [`status`](Self::status) or [`subscribe`](Self::subscribe).
    pub fn request_save(self: &Arc<Self>, form: SettingsForm) -> bool {
        if !self.status.borrow().accepts_requests() {
            debug!("save refused, previous failure not acknowledged");
            return false;
        }

        *self.pending.lock().unwrap_or_else(|e| e.into_inner()) = Some(form);

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("save already in flight, request coalesced");
            return true;
        }

        let this = Arc::clone(self);
        tokio::spawn(async move { this.drain().await });
        true
    }

    /// Reset a `Failed` status back to `Ready`.
    pub fn acknowledge_failure(&self) {
        self.status.send_if_modified(|status| {
            if matches!(status, SaveStatus::Failed(_)) {
                *status = SaveStatus::Ready;
                true
            } else {
                false
            }
        });
    }

    /// Whether a background save worker is running.
    pub fn is_saving(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    async fn drain(&self) {
        loop {
            let next = self.take_pending();
            let Some(form) = next else {
                self.in_flight.store(false, Ordering::Release);
                // A request may have landed between `take_pending` and the store above.
                let queued = self
                    .pending
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .is_some();
                if queued
                    && self
                        .in_flight
                        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                {
                    continue;
                }
                return;
            };

            if self.apply_edits(form).await.is_err() {
                if self.take_pending().is_some() {
                    warn!("queued settings form dropped after a failed save");
                }
                self.in_flight.store(false, Ordering::Release);
                return;
            }
        }
    }

    fn take_pending(&self) -> Option<SettingsForm> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner()).take()
    }
}
