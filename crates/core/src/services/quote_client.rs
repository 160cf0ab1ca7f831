use serde::Deserialize;
use tracing::{debug, warn};

use crate::models::quote::{Coin, FetchFailure, FetchOutcome};
use crate::providers::traits::MarketApi;

/// Outcome of asking the provider about an API key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyCheck {
    /// The key-info endpoint answered 200.
    Valid,
    /// Any other status: bad key, exhausted plan, rate limit, outage.
    Rejected { status: u16 },
    /// No answer at all.
    Unreachable(String),
}

// ── CoinMarketCap category response ─────────────────────────────────

#[derive(Deserialize)]
struct CategoryResponse {
    data: CategoryData,
}

#[derive(Deserialize)]
struct CategoryData {
    coins: Vec<Coin>,
}

/// Validates API keys and fetches category quotes through a [`MarketApi`].
///
/// Every fetch validates the key first, so a rejected key never spends
/// quota on the category request. There is no retry: a failed fetch is
/// reported and the next refresh cycle simply tries again.
pub struct QuoteClient {
    api: Box<dyn MarketApi>,
}

impl QuoteClient {
    pub fn new(api: Box<dyn MarketApi>) -> Self {
        Self { api }
    }

    pub fn provider_name(&self) -> &str {
        self.api.name()
    }

    /// Ask the key-info endpoint whether `api_key` is usable.
    pub async fn check_key(&self, api_key: &str) -> KeyCheck {
        match self.api.key_info(api_key).await {
            Ok(resp) if resp.is_ok() => KeyCheck::Valid,
            Ok(resp) => KeyCheck::Rejected {
                status: resp.status,
            },
            Err(e) => KeyCheck::Unreachable(e.to_string()),
        }
    }

    /// `true` iff the key-info endpoint answered exactly 200.
    pub async fn validate_key(&self, api_key: &str) -> bool {
        self.check_key(api_key).await == KeyCheck::Valid
    }

    /// Fetch every coin of `portfolio_id`.
    ///
    /// An empty key fails immediately without touching the network.
    pub async fn fetch_quotes(&self, api_key: &str, portfolio_id: &str) -> FetchOutcome {
        if api_key.is_empty() {
            debug!("no API key configured, skipping fetch");
            return FetchOutcome::Failure(FetchFailure::InvalidKey);
        }

        match self.check_key(api_key).await {
            KeyCheck::Valid => {}
            KeyCheck::Rejected { status } => {
                warn!(provider = self.api.name(), status, "API key rejected");
                return FetchOutcome::Failure(FetchFailure::InvalidKey);
            }
            KeyCheck::Unreachable(msg) => {
                warn!(provider = self.api.name(), error = %msg, "key validation failed");
                return FetchOutcome::Failure(FetchFailure::Network(msg));
            }
        }

        let resp = match self.api.category(api_key, portfolio_id).await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(provider = self.api.name(), error = %e, "category request failed");
                return FetchOutcome::Failure(FetchFailure::Network(e.to_string()));
            }
        };

        if !resp.is_ok() {
            warn!(
                provider = self.api.name(),
                status = resp.status,
                portfolio_id,
                "category request returned non-200"
            );
            return FetchOutcome::Failure(FetchFailure::NonSuccess {
                status: resp.status,
            });
        }

        match serde_json::from_str::<CategoryResponse>(&resp.body) {
            Ok(parsed) => {
                debug!(coins = parsed.data.coins.len(), "quotes fetched");
                FetchOutcome::Success(parsed.data.coins)
            }
            Err(e) => {
                warn!(provider = self.api.name(), error = %e, "failed to parse category response");
                FetchOutcome::Failure(FetchFailure::Malformed(e.to_string()))
            }
        }
    }
}
