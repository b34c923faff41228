use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

use crate::shared::config::AppCfg;
use crate::shared::errors::ApiError;
use crate::shared::types::{DataEnvelope, PoolHistoryPoint, ProtocolData, RawPool};
use super::YieldsApi;

/// HTTP client for the DefiLlama yields / protocol endpoints
pub struct LlamaApiClient {
    http_client: Client,
    pools_url: String,
    protocol_url: String,
    history_url: String,
}

impl LlamaApiClient {
    pub fn new(cfg: &AppCfg) -> Result<Self, ApiError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            pools_url: cfg.pools_url.clone(),
            protocol_url: cfg.protocol_url.clone(),
            history_url: cfg.history_url.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        debug!("GET {}", url);

        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { status: status.as_u16(), url: url.to_string() });
        }

        let body = response.bytes().await?;
        let parsed = serde_json::from_slice(&body)?;
        Ok(parsed)
    }
}

/// Append URL-encoded path segments to a base URL
pub fn join_segments(base: &str, segments: &[&str]) -> Result<String, ApiError> {
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(ApiError::InvalidUrl(base.to_string()));
    }

    let mut url = base.trim_end_matches('/').to_string();
    for segment in segments {
        url.push('/');
        url.push_str(&urlencoding::encode(segment));
    }
    Ok(url)
}

#[async_trait]
impl YieldsApi for LlamaApiClient {
    async fn fetch_pools(&self) -> Result<Vec<RawPool>, ApiError> {
        info!("🔍 Fetching pools from {}", self.pools_url);
        let envelope: DataEnvelope<RawPool> = self.get_json(&self.pools_url).await?;
        info!("✅ Received {} pools", envelope.data.len());
        Ok(envelope.data)
    }

    async fn fetch_protocol(&self, project: &str) -> Result<ProtocolData, ApiError> {
        let url = join_segments(&self.protocol_url, &[project])?;
        info!("🔍 Fetching protocol data for {}", project);
        self.get_json(&url).await
    }

    async fn fetch_pool_history(
        &self,
        project: &str,
        chain: &str,
        symbol: &str,
    ) -> Result<Vec<PoolHistoryPoint>, ApiError> {
        let url = join_segments(&self.history_url, &[project, chain, symbol])?;
        info!("🔍 Fetching history for {}/{}/{}", project, chain, symbol);
        let envelope: DataEnvelope<PoolHistoryPoint> = self.get_json(&url).await?;
        Ok(envelope.data)
    }
}
