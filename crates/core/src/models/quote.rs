use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One coin as returned inside a CoinMarketCap category response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub id: u64,
    pub symbol: String,
    pub name: String,
    /// ISO-8601 timestamp of the provider's last update.
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub quote: CoinQuote,
}

impl Coin {
    /// USD price, if the provider reported one.
    pub fn price_usd(&self) -> Option<f64> {
        self.quote.usd.as_ref().and_then(|q| q.price)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoinQuote {
    #[serde(rename = "USD", default)]
    pub usd: Option<UsdQuote>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsdQuote {
    #[serde(default)]
    pub price: Option<f64>,
}

/// A single table row, every cell already formatted for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRow {
    pub id: String,
    pub symbol: String,
    pub name: String,
    /// Calendar-date part (`YYYY-MM-DD`) of the last update.
    pub last_updated_date: String,
    /// Price with two decimals, or `"N/A"`.
    pub price_usd: String,
}

/// Column headings matching [`QuoteRow::cells`].
pub const COLUMNS: [&str; 5] = ["ID", "Símbolo", "Nombre", "Hora de Actualización", "Precio USD"];

/// Placeholder shown in the price column when no price is available.
pub const PRICE_NOT_AVAILABLE: &str = "N/A";

impl QuoteRow {
    /// The placeholder row that points the user at the settings screen.
    pub fn sentinel() -> Self {
        Self {
            id: "Ve".to_string(),
            symbol: "a".to_string(),
            name: "Configuracion".to_string(),
            last_updated_date: String::new(),
            price_usd: String::new(),
        }
    }

    pub fn cells(&self) -> [&str; 5] {
        [
            self.id.as_str(),
            self.symbol.as_str(),
            self.name.as_str(),
            self.last_updated_date.as_str(),
            self.price_usd.as_str(),
        ]
    }
}

impl From<&Coin> for QuoteRow {
    fn from(coin: &Coin) -> Self {
        Self {
            id: coin.id.to_string(),
            symbol: coin.symbol.clone(),
            name: coin.name.clone(),
            last_updated_date: coin
                .last_updated
                .as_deref()
                .map(truncate_date)
                .unwrap_or_default(),
            price_usd: format_price(coin.price_usd()),
        }
    }
}

/// First ten characters of a timestamp (the `YYYY-MM-DD` part).
pub fn truncate_date(timestamp: &str) -> String {
    timestamp.chars().take(10).collect()
}

pub fn format_price(price: Option<f64>) -> String {
    match price {
        Some(p) => format!("{p:.2}"),
        None => PRICE_NOT_AVAILABLE.to_string(),
    }
}

/// Why a refresh cycle produced no quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// The key is empty or the key-info endpoint answered with something other than 200.
    InvalidKey,
    /// The category endpoint answered with something other than 200.
    NonSuccess { status: u16 },
    /// The provider could not be reached.
    Network(String),
    /// A 200 response whose body did not have the expected shape.
    Malformed(String),
    /// The settings file could not be read, so nothing was fetched.
    ConfigUnreadable(String),
}

impl std::fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchFailure::InvalidKey => write!(f, "API key missing or rejected"),
            FetchFailure::NonSuccess { status } => {
                write!(f, "Quote request failed with HTTP {status}")
            }
            FetchFailure::Network(msg) => write!(f, "Provider unreachable: {msg}"),
            FetchFailure::Malformed(msg) => write!(f, "Unexpected response: {msg}"),
            FetchFailure::ConfigUnreadable(msg) => write!(f, "Settings unavailable: {msg}"),
        }
    }
}

/// Result of one quote fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Success(Vec<Coin>),
    Failure(FetchFailure),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }

    /// Rows to display: one per coin on success, the sentinel row otherwise.
    pub fn rows(&self) -> Vec<QuoteRow> {
        match self {
            FetchOutcome::Success(coins) => coins.iter().map(QuoteRow::from).collect(),
            FetchOutcome::Failure(_) => vec![QuoteRow::sentinel()],
        }
    }

    pub fn failure(&self) -> Option<&FetchFailure> {
        match self {
            FetchOutcome::Success(_) => None,
            FetchOutcome::Failure(reason) => Some(reason),
        }
    }
}

/// A full replacement of the dashboard table, handed to the display layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TableUpdate {
    pub rows: Vec<QuoteRow>,
    pub failure: Option<FetchFailure>,
    pub fetched_at: DateTime<Utc>,
}

impl TableUpdate {
    pub fn from_outcome(outcome: &FetchOutcome) -> Self {
        Self {
            rows: outcome.rows(),
            failure: outcome.failure().cloned(),
            fetched_at: Utc::now(),
        }
    }
}
