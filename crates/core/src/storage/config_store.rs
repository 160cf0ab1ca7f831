use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info};

use crate::errors::CoreError;
use crate::models::settings::{SettingKey, Settings};

/// Durable home of the settings record: a flat JSON file, read whole and
/// rewritten whole on every change.
///
/// All access goes through one internal lock, so a read-modify-write never
/// interleaves with another writer or with a reader. Each write lands in a
/// fresh temp file in the same directory that is then renamed over the
/// settings file, so readers only ever see a complete record.
pub struct ConfigStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore").field("path", &self.path).finish()
    }
}

impl ConfigStore {
    /// Point at an existing settings file. Nothing is read until [`load`](Self::load).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Open the settings file, writing first-run defaults if it does not exist.
    ///
    /// An existing file that cannot be parsed is reported as
    /// [`CoreError::ConfigUnreadable`] and left untouched.
    pub fn open_or_init(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let store = Self::new(path);
        if store.path.exists() {
            store.load()?;
        } else {
            if let Some(parent) = store.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let _guard = store.lock.lock().unwrap_or_else(|e| e.into_inner());
            store.write(&Settings::default())?;
            info!(path = %store.path.display(), "created settings file with defaults");
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full settings record.
    pub fn load(&self) -> Result<Settings, CoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.read()
    }

    /// Overwrite a single key and persist the whole record.
    /// Returns the record as written.
    pub fn set(&self, key: SettingKey, value: &str) -> Result<Settings, CoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut settings = self.read()?;
        settings.set(key, value)?;
        self.write(&settings)?;
        debug!(key = %key, "setting updated");
        Ok(settings)
    }

    /// Apply several edits as one read-modify-write.
    ///
    /// Every edit is validated before anything is written; if one fails
    /// the file keeps its previous contents.
    pub fn apply(&self, edits: &[(SettingKey, String)]) -> Result<Settings, CoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut settings = self.read()?;
        for (key, value) in edits {
            settings.set(*key, value)?;
        }
        self.write(&settings)?;
        debug!(edits = edits.len(), "settings batch written");
        Ok(settings)
    }

    // Callers must hold `self.lock`.
    fn read(&self) -> Result<Settings, CoreError> {
        let raw = std::fs::read_to_string(&self.path).map_err(|e| self.unreadable(e))?;
        serde_json::from_str(&raw).map_err(|e| self.unreadable(e))
    }

    // Callers must hold `self.lock`. Each write gets its own temp file, so
    // other stores (or processes) on the same path never share one.
    fn write(&self, settings: &Settings) -> Result<(), CoreError> {
        let json = to_pretty_json(settings)?;
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&json)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    fn unreadable(&self, reason: impl std::fmt::Display) -> CoreError {
        CoreError::ConfigUnreadable {
            path: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Four-space indented JSON, matching the file layout users already have.
fn to_pretty_json(settings: &Settings) -> Result<Vec<u8>, CoreError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    serde::Serialize::serialize(settings, &mut ser)
        .map_err(|e| CoreError::Serialization(format!("Failed to serialize settings: {e}")))?;
    Ok(buf)
}
