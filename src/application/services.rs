//! Application services and use cases

use std::sync::Arc;
use tracing::info;

use crate::infrastructure::{LlamaApiClient, YieldsApi};
use crate::shared::config::AppCfg;
use crate::shared::errors::AppError;
use super::history::HistoryLoader;
use super::pool_detail::PoolDetailView;
use super::pool_list::PoolListView;
use super::{PoolDataStore, SelectionStore};

/// Wires the stores into the list and detail views.
/// Both views share one data store and one selection store.
pub struct DashboardService {
    pub store: PoolDataStore,
    pub selection: SelectionStore,
    pub list: PoolListView,
    pub detail: PoolDetailView,
}

impl DashboardService {
    pub fn new(api: Arc<dyn YieldsApi>, decimals: usize) -> Self {
        let store = PoolDataStore::new(api.clone());
        let selection = SelectionStore::new();
        let history = HistoryLoader::new(api);

        Self {
            list: PoolListView::new(store.clone(), selection.clone(), decimals),
            detail: PoolDetailView::new(store.clone(), selection.clone(), history, decimals),
            store,
            selection,
        }
    }

    /// Dashboard backed by the HTTP API client
    pub fn from_config(cfg: &AppCfg) -> Result<Self, AppError> {
        info!("Using pools endpoint {}", cfg.pools_url);
        let api = LlamaApiClient::new(cfg)?;
        Ok(Self::new(Arc::new(api), cfg.decimals))
    }
}
