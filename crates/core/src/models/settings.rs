use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

use crate::errors::CoreError;

/// Text the settings form shows in the API key field while no key is stored.
/// Writing it back is treated the same as writing an empty value.
pub const API_KEY_PLACEHOLDER: &str = "Ingrese aquí Api Key";

/// CoinMarketCap category used on first run.
pub const DEFAULT_PORTFOLIO_ID: &str = "605e2ce9d41eae1066535f7c";

pub const DEFAULT_HOT_RELOAD_SECS: u64 = 10;
pub const MIN_HOT_RELOAD_SECS: u64 = 5;
pub const MAX_HOT_RELOAD_SECS: u64 = 30;

/// Visual theme catalog offered by the settings form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Vapor,
    Darkly,
    Morph,
    Minty,
    Superhero,
    Solar,
    Cosmo,
    Journal,
}

impl Theme {
    /// All themes, in the order the selector lists them.
    pub const ALL: [Theme; 8] = [
        Theme::Vapor,
        Theme::Darkly,
        Theme::Morph,
        Theme::Minty,
        Theme::Superhero,
        Theme::Solar,
        Theme::Cosmo,
        Theme::Journal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Vapor => "vapor",
            Theme::Darkly => "darkly",
            Theme::Morph => "morph",
            Theme::Minty => "minty",
            Theme::Superhero => "superhero",
            Theme::Solar => "solar",
            Theme::Cosmo => "cosmo",
            Theme::Journal => "journal",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Theme::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::ValidationError(format!("Unknown theme: '{s}'")))
    }
}

/// The four fixed keys of the settings record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    ApiKey,
    PortfolioId,
    HotReload,
    ColorTheme,
}

impl SettingKey {
    pub const ALL: [SettingKey; 4] = [
        SettingKey::ApiKey,
        SettingKey::PortfolioId,
        SettingKey::HotReload,
        SettingKey::ColorTheme,
    ];

    /// Key name as it appears in the settings file.
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::ApiKey => "API_KEY",
            SettingKey::PortfolioId => "ID_PORTAFOLIO",
            SettingKey::HotReload => "HOT_RELOAD",
            SettingKey::ColorTheme => "Color Tema",
        }
    }
}

impl std::fmt::Display for SettingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| CoreError::ValidationError(format!("Unknown setting key: '{s}'")))
    }
}

/// User-configurable settings, persisted as a flat JSON object.
///
/// All four keys are required when reading; a record missing any of them
/// is treated as corrupt rather than silently patched with defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// CoinMarketCap API key. Empty means "not set".
    #[serde(rename = "API_KEY")]
    pub api_key: String,

    /// Category id whose coins are listed on the dashboard.
    #[serde(rename = "ID_PORTAFOLIO")]
    pub portfolio_id: String,

    /// Seconds between refresh cycles. `None` when the stored value is empty.
    #[serde(rename = "HOT_RELOAD", with = "hot_reload_field")]
    pub hot_reload: Option<u64>,

    #[serde(rename = "Color Tema")]
    pub theme: Theme,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            portfolio_id: DEFAULT_PORTFOLIO_ID.to_string(),
            hot_reload: Some(DEFAULT_HOT_RELOAD_SECS),
            theme: Theme::Cosmo,
        }
    }
}

impl Settings {
    /// Whether an API key has been stored.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Effective sleep between refresh cycles, always within 5–30 seconds.
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        let secs = self
            .hot_reload
            .unwrap_or(DEFAULT_HOT_RELOAD_SECS)
            .clamp(MIN_HOT_RELOAD_SECS, MAX_HOT_RELOAD_SECS);
        Duration::from_secs(secs)
    }

    /// Textual stored value of a key, as it would appear in the file.
    #[must_use]
    pub fn get(&self, key: SettingKey) -> String {
        match key {
            SettingKey::ApiKey => self.api_key.clone(),
            SettingKey::PortfolioId => self.portfolio_id.clone(),
            SettingKey::HotReload => self.hot_reload.map(|s| s.to_string()).unwrap_or_default(),
            SettingKey::ColorTheme => self.theme.to_string(),
        }
    }

    /// Overwrite one key with a user-supplied value.
    ///
    /// Every key except the theme treats an empty value or the API key
    /// placeholder as "not set" and stores an empty value. `HOT_RELOAD`
    /// is clamped into 5–30; the theme must be one of [`Theme::ALL`].
    pub fn set(&mut self, key: SettingKey, value: &str) -> Result<(), CoreError> {
        match key {
            SettingKey::ApiKey => self.api_key = normalize(value).to_string(),
            SettingKey::PortfolioId => self.portfolio_id = normalize(value).to_string(),
            SettingKey::HotReload => self.hot_reload = parse_hot_reload(normalize(value))?,
            SettingKey::ColorTheme => self.theme = value.parse()?,
        }
        Ok(())
    }
}

fn normalize(value: &str) -> &str {
    if value.is_empty() || value == API_KEY_PLACEHOLDER {
        ""
    } else {
        value
    }
}

fn parse_hot_reload(value: &str) -> Result<Option<u64>, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let secs: u64 = trimmed.parse().map_err(|_| {
        CoreError::ValidationError(format!(
            "HOT_RELOAD must be a whole number of seconds, got '{value}'"
        ))
    })?;
    Ok(Some(secs.clamp(MIN_HOT_RELOAD_SECS, MAX_HOT_RELOAD_SECS)))
}

/// `HOT_RELOAD` is written as an integer, or `""` once cleared. Older files
/// may carry the number as a string.
mod hot_reload_field {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S: Serializer>(value: &Option<u64>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(secs) => s.serialize_u64(*secs),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
        match Value::deserialize(d)? {
            Value::Number(n) => n
                .as_u64()
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid HOT_RELOAD value: {n}"))),
            Value::String(s) if s.trim().is_empty() => Ok(None),
            Value::String(s) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("invalid HOT_RELOAD value: '{s}'"))),
            other => Err(D::Error::custom(format!("invalid HOT_RELOAD value: {other}"))),
        }
    }
}
