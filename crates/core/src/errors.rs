use thiserror::Error;

/// Unified error type for the entire mini-dash-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Settings file ───────────────────────────────────────────────
    #[error("Settings file unreadable ({path}): {reason}")]
    ConfigUnreadable { path: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("File I/O error: {0}")]
    FileIO(String),

    // ── Network ─────────────────────────────────────────────────────
    #[error("Network error: {0}")]
    Network(String),

    // ── Settings edits ──────────────────────────────────────────────
    #[error("Setting validation failed: {0}")]
    ValidationError(String),

    #[error("Saving settings failed: {0}")]
    SaveFailed(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors carry the full request URL, query string included.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
