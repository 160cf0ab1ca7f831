use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::traits::{ApiResponse, MarketApi};
use crate::errors::CoreError;

pub const BASE_URL: &str = "https://pro-api.coinmarketcap.com";

const API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";

/// CoinMarketCap Pro API transport.
///
/// - **Auth**: static API key sent in the `X-CMC_PRO_API_KEY` header.
/// - **Endpoints**: `/v1/key/info`, `/v1/cryptocurrency/category?id={category}`
pub struct CoinMarketCapApi {
    client: Client,
    base_url: String,
}

impl CoinMarketCapApi {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// Use a different host, e.g. the CoinMarketCap sandbox.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(
        &self,
        path: &str,
        api_key: &str,
        query: &[(&str, &str)],
    ) -> Result<ApiResponse, CoreError> {
        let url = format!("{}{path}", self.base_url);
        let resp = self
            .client
            .get(&url)
            .header("Accepts", "application/json")
            .header(API_KEY_HEADER, api_key)
            .query(query)
            .send()
            .await?;

        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(ApiResponse { status, body })
    }
}

impl Default for CoinMarketCapApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketApi for CoinMarketCapApi {
    fn name(&self) -> &str {
        "CoinMarketCap"
    }

    async fn key_info(&self, api_key: &str) -> Result<ApiResponse, CoreError> {
        self.get("/v1/key/info", api_key, &[]).await
    }

    async fn category(&self, api_key: &str, category_id: &str) -> Result<ApiResponse, CoreError> {
        self.get("/v1/cryptocurrency/category", api_key, &[("id", category_id)])
            .await
    }
}
