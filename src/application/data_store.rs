//! In-memory cache of the pool list and per-protocol metadata

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::infrastructure::YieldsApi;
use crate::shared::types::{Pool, ProtocolData};

#[derive(Debug, Default)]
struct StoreState {
    pools: Arc<Vec<Pool>>,
    /// Bumped on every change to `pools`
    pools_version: u64,
    protocol_data: HashMap<String, ProtocolData>,
    in_flight: usize,
    error: Option<String>,
}

/// Remote data store. Fetch failures never reach the caller; they land in `error()`.
#[derive(Clone)]
pub struct PoolDataStore {
    api: Arc<dyn YieldsApi>,
    state: Arc<RwLock<StoreState>>,
}

impl PoolDataStore {
    pub fn new(api: Arc<dyn YieldsApi>) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(StoreState::default())),
        }
    }

    async fn begin_load(&self) {
        let mut state = self.state.write().await;
        state.in_flight += 1;
        state.error = None;
    }

    /// Replace the cached pool list. On failure the previous list stays.
    pub async fn fetch_pools(&self) {
        self.begin_load().await;

        let result = self.api.fetch_pools().await;

        let mut state = self.state.write().await;
        state.in_flight = state.in_flight.saturating_sub(1);
        match result {
            Ok(raw) => {
                let pools: Vec<Pool> = raw.into_iter().map(Pool::from).collect();
                info!("✅ Cached {} pools", pools.len());
                state.pools = Arc::new(pools);
                state.pools_version += 1;
            }
            Err(e) => {
                error!("❌ Failed to fetch pools: {}", e);
                state.error = Some(format!("Failed to fetch pools data: {}", e));
            }
        }
    }

    /// Fetch metadata for `project` unless it is already cached
    pub async fn fetch_protocol_data(&self, project: &str) {
        if self.state.read().await.protocol_data.contains_key(project) {
            debug!("Protocol data for {} already cached", project);
            return;
        }

        self.begin_load().await;

        let result = self.api.fetch_protocol(project).await;

        let mut state = self.state.write().await;
        state.in_flight = state.in_flight.saturating_sub(1);
        match result {
            Ok(data) => {
                info!("✅ Cached protocol data for {}", project);
                state.protocol_data.insert(project.to_string(), data);
            }
            Err(e) => {
                warn!("⚠️ Failed to fetch protocol data for {}: {}", project, e);
                state.error = Some(format!("Failed to fetch protocol data: {}", e));
            }
        }
    }

    /// Attach computed metrics to a cached pool; unknown ids are ignored
    pub async fn update_pool_metrics(&self, pool_id: &str, volatility: f64, sharpe_ratio: f64) {
        let mut state = self.state.write().await;
        let Some(index) = state.pools.iter().position(|p| p.id == pool_id) else {
            debug!("No cached pool {} to update", pool_id);
            return;
        };

        let pool = &mut Arc::make_mut(&mut state.pools)[index];
        if pool.volatility == Some(volatility) && pool.sharpe_ratio == Some(sharpe_ratio) {
            return;
        }
        pool.volatility = Some(volatility);
        pool.sharpe_ratio = Some(sharpe_ratio);
        state.pools_version += 1;
    }

    pub async fn pools(&self) -> Arc<Vec<Pool>> {
        self.state.read().await.pools.clone()
    }

    /// Pool list together with its version, for memoized projections
    pub async fn pools_snapshot(&self) -> (u64, Arc<Vec<Pool>>) {
        let state = self.state.read().await;
        (state.pools_version, state.pools.clone())
    }

    pub async fn find_pool(&self, pool_id: &str) -> Option<Pool> {
        self.state.read().await.pools.iter().find(|p| p.id == pool_id).cloned()
    }

    /// `None` means not loaded yet, not "confirmed empty"
    pub async fn protocol_data(&self, project: &str) -> Option<ProtocolData> {
        self.state.read().await.protocol_data.get(project).cloned()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.in_flight > 0
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }
}
