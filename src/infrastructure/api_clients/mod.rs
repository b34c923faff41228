pub mod llama_client;

pub use llama_client::LlamaApiClient;

use async_trait::async_trait;
use crate::shared::errors::ApiError;
use crate::shared::types::{PoolHistoryPoint, ProtocolData, RawPool};

/// Remote yields data source
#[async_trait]
pub trait YieldsApi: Send + Sync {
    /// Fetch the full pool list
    async fn fetch_pools(&self) -> Result<Vec<RawPool>, ApiError>;

    /// Fetch metadata for one protocol
    async fn fetch_protocol(&self, project: &str) -> Result<ProtocolData, ApiError>;

    /// Fetch the history series of the pool identified by (project, chain, symbol)
    async fn fetch_pool_history(
        &self,
        project: &str,
        chain: &str,
        symbol: &str,
    ) -> Result<Vec<PoolHistoryPoint>, ApiError>;
}
