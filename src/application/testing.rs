//! In-memory `YieldsApi` for tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::infrastructure::YieldsApi;
use crate::shared::errors::ApiError;
use crate::shared::types::{PoolHistoryPoint, ProtocolData, RawPool};

pub fn raw_pool(id: &str, symbol: &str, project: &str, chain: &str, apy: f64, mu: f64, sigma: f64) -> RawPool {
    RawPool {
        pool: id.to_string(),
        symbol: symbol.to_string(),
        project: project.to_string(),
        chain: chain.to_string(),
        apy: Some(apy),
        mu: Some(mu),
        sigma: Some(sigma),
    }
}

pub fn point(timestamp: i64, apy: f64, tvl_usd: f64) -> PoolHistoryPoint {
    PoolHistoryPoint { timestamp: Some(timestamp), apy: Some(apy), tvl_usd: Some(tvl_usd) }
}

fn unavailable(url: &str) -> ApiError {
    ApiError::Status { status: 500, url: url.to_string() }
}

/// `None` pools or a missing protocol / history entry makes that call fail
#[derive(Default)]
pub struct MockApi {
    pools: Mutex<Option<Vec<RawPool>>>,
    protocols: HashMap<String, ProtocolData>,
    /// keyed by symbol: (latency, series)
    histories: HashMap<String, (Duration, Vec<PoolHistoryPoint>)>,
    delay: Duration,
    pool_calls: AtomicUsize,
    protocol_calls: AtomicUsize,
    history_calls: AtomicUsize,
}

impl MockApi {
    pub fn with_pools(pools: Vec<RawPool>) -> Self {
        let api = Self::default();
        api.set_pools(Some(pools));
        api
    }

    pub fn with_protocol(mut self, project: &str, data: ProtocolData) -> Self {
        self.protocols.insert(project.to_string(), data);
        self
    }

    pub fn with_history(mut self, symbol: &str, latency: Duration, points: Vec<PoolHistoryPoint>) -> Self {
        self.histories.insert(symbol.to_string(), (latency, points));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn set_pools(&self, pools: Option<Vec<RawPool>>) {
        *self.pools.lock().unwrap() = pools;
    }

    pub fn pool_calls(&self) -> usize {
        self.pool_calls.load(Ordering::SeqCst)
    }

    pub fn protocol_calls(&self) -> usize {
        self.protocol_calls.load(Ordering::SeqCst)
    }

    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl YieldsApi for MockApi {
    async fn fetch_pools(&self) -> Result<Vec<RawPool>, ApiError> {
        self.pool_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        let pools = self.pools.lock().unwrap().clone();
        pools.ok_or_else(|| unavailable("mock://pools"))
    }

    async fn fetch_protocol(&self, project: &str) -> Result<ProtocolData, ApiError> {
        self.protocol_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.protocols.get(project).cloned().ok_or_else(|| unavailable("mock://protocol"))
    }

    async fn fetch_pool_history(
        &self,
        _project: &str,
        _chain: &str,
        symbol: &str,
    ) -> Result<Vec<PoolHistoryPoint>, ApiError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        match self.histories.get(symbol) {
            Some((latency, points)) => {
                tokio::time::sleep(*latency).await;
                Ok(points.clone())
            }
            None => Err(unavailable("mock://history")),
        }
    }
}
