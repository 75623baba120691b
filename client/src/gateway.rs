//! The remote gateway: the request/response contract the core depends on.
//!
//! All three operations are single-shot POSTs to one fixed endpoint with
//! the intended operation encoded in an `action` discriminator field. The
//! sync worker and the lookup cache only ever see the [`RemoteGateway`]
//! trait, so tests substitute a scripted implementation.

use crate::config::Config;
use crate::error::Result;
use async_trait::async_trait;
use rollstock_engine::InventoryRecord;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

/// Wire request body, discriminated by `action`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ApiRequest<'a> {
    Login {
        username: &'a str,
        password: &'a str,
    },
    Search {
        sku: &'a str,
    },
    #[serde(rename_all = "camelCase")]
    SaveBatch {
        data: &'a [serde_json::Value],
        sheet_name: &'a str,
    },
}

/// Response to a login request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    #[serde(default)]
    pub is_valid: bool,
}

/// Response to a search request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub success: bool,
    #[serde(default)]
    pub found: bool,
    #[serde(default)]
    pub data: Option<InventoryRecord>,
}

/// Response to a batched save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// The remote API surface consumed by the sync worker and the cache.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Authenticate an operator.
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse>;

    /// Look up a record by SKU or package id.
    async fn search(&self, code: &str) -> Result<SearchResponse>;

    /// Deliver one batch of wire lines to a destination sheet.
    async fn save_batch(
        &self,
        lines: &[serde_json::Value],
        destination: &str,
    ) -> Result<SaveResponse>;
}

/// HTTP implementation over the spreadsheet-backed endpoint.
pub struct HttpGateway {
    client: reqwest::Client,
    endpoint_url: String,
}

impl HttpGateway {
    /// Build the gateway with the configured per-request timeout.
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint_url: config.endpoint_url.clone(),
        })
    }

    /// POST one request body and decode the JSON response. A non-2xx
    /// status or a parse failure surfaces as a transport error.
    async fn send<T: DeserializeOwned>(&self, request: &ApiRequest<'_>) -> Result<T> {
        let response = self
            .client
            .post(&self.endpoint_url)
            .json(request)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl RemoteGateway for HttpGateway {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        self.send(&ApiRequest::Login { username, password }).await
    }

    async fn search(&self, code: &str) -> Result<SearchResponse> {
        self.send(&ApiRequest::Search { sku: code }).await
    }

    async fn save_batch(
        &self,
        lines: &[serde_json::Value],
        destination: &str,
    ) -> Result<SaveResponse> {
        let response: SaveResponse = self
            .send(&ApiRequest::SaveBatch {
                data: lines,
                sheet_name: destination,
            })
            .await?;

        if !response.success {
            let message = response
                .message
                .clone()
                .unwrap_or_else(|| "unknown API error".to_string());
            tracing::warn!(destination, %message, "batch rejected by remote");
        }

        Ok(response)
    }
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway")
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}
