use async_trait::async_trait;

use crate::errors::CoreError;

/// Raw HTTP answer from a market data endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Transport seam for the quote provider.
///
/// Implementations only move bytes: any HTTP status comes back as
/// `Ok(ApiResponse)`, and `Err` is reserved for requests that never got an
/// answer. Status interpretation and body parsing live in `QuoteClient`.
#[async_trait]
pub trait MarketApi: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Query the key-info endpoint with `api_key`.
    async fn key_info(&self, api_key: &str) -> Result<ApiResponse, CoreError>;

    /// Fetch the quotes of every coin in a category.
    async fn category(&self, api_key: &str, category_id: &str) -> Result<ApiResponse, CoreError>;
}
