//! Pool table view model

use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::domain::pool::{PoolQuery, PoolQueryEngine, QueryResult, SharpeRatio, SortDirection, SortKey};
use crate::shared::types::Pool;
use crate::shared::utils::format_as_percentage_with;
use super::{PoolDataStore, SelectionStore};

/// One formatted table row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolRow {
    pub id: String,
    pub symbol: String,
    pub project: String,
    pub chain: String,
    pub apy: String,
    pub mu: String,
    pub sigma: String,
    pub sharpe_ratio: String,
    pub low_sharpe: bool,
}

impl PoolRow {
    pub fn from_pool(pool: &Pool, decimals: usize) -> Self {
        let ratio = SharpeRatio::of(pool);
        Self {
            id: pool.id.clone(),
            symbol: pool.symbol.clone(),
            project: pool.project.clone(),
            chain: pool.chain.clone(),
            apy: format_as_percentage_with(pool.apy / 100.0, decimals),
            mu: format_as_percentage_with(pool.mu / 100.0, decimals),
            sigma: format_as_percentage_with(pool.sigma / 100.0, decimals),
            sharpe_ratio: ratio.to_string(),
            low_sharpe: ratio.is_low(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListPage {
    pub query: PoolQuery,
    pub total_matches: usize,
    pub page_count: usize,
    pub rows: Vec<PoolRow>,
    /// Last fetch error while an older snapshot is still shown
    pub stale_error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ListState {
    Loading,
    Failed { error: String },
    Ready(ListPage),
}

/// Filterable, sortable, paginated pool table over the data store
pub struct PoolListView {
    store: PoolDataStore,
    selection: SelectionStore,
    query: PoolQuery,
    engine: PoolQueryEngine,
    decimals: usize,
}

impl PoolListView {
    pub fn new(store: PoolDataStore, selection: SelectionStore, decimals: usize) -> Self {
        Self {
            store,
            selection,
            query: PoolQuery::default(),
            engine: PoolQueryEngine::new(),
            decimals,
        }
    }

    /// Populate the pool cache
    pub async fn load(&self) {
        self.store.fetch_pools().await;
    }

    pub fn query(&self) -> &PoolQuery {
        &self.query
    }

    pub fn set_project_filter(&mut self, text: &str) {
        self.query.set_project_filter(text);
    }

    pub fn set_chain_filter(&mut self, text: &str) {
        self.query.set_chain_filter(text);
    }

    pub fn set_token_filter(&mut self, text: &str) {
        self.query.set_token_filter(text);
    }

    pub fn toggle_sort(&mut self, key: SortKey) {
        self.query.toggle_sort(key);
    }

    pub fn set_sort(&mut self, key: SortKey, direction: SortDirection) {
        self.query.set_sort(key, direction);
    }

    pub fn set_page(&mut self, page: usize) {
        self.query.set_page(page);
    }

    pub async fn next_page(&mut self) {
        let result = self.current().await;
        if self.query.page < result.page_count {
            self.query.set_page(self.query.page + 1);
        }
    }

    pub fn prev_page(&mut self) {
        self.query.set_page(self.query.page.saturating_sub(1));
    }

    async fn current(&mut self) -> Arc<QueryResult> {
        let (version, pools) = self.store.pools_snapshot().await;
        self.engine.project(version, &pools, &self.query)
    }

    pub async fn state(&mut self) -> ListState {
        let (version, pools) = self.store.pools_snapshot().await;
        let error = self.store.error().await;

        if pools.is_empty() {
            if let Some(error) = error {
                return ListState::Failed { error };
            }
            if self.store.is_loading().await {
                return ListState::Loading;
            }
        }

        let result = self.engine.project(version, &pools, &self.query);
        ListState::Ready(ListPage {
            query: self.query.clone(),
            total_matches: result.total_matches,
            page_count: result.page_count,
            rows: result.rows.iter().map(|p| PoolRow::from_pool(p, self.decimals)).collect(),
            stale_error: error,
        })
    }

    /// Select the `index`-th row (0-based) of the current page; returns its pool id
    pub async fn select_row(&mut self, index: usize) -> Option<String> {
        let result = self.current().await;
        let pool = result.rows.get(index)?;
        info!("Opening pool {} ({} on {})", pool.id, pool.symbol, pool.chain);
        self.selection.set_selected_pool_id(Some(pool.id.clone())).await;
        Some(pool.id.clone())
    }

    pub async fn select_pool(&self, pool_id: &str) {
        self.selection.set_selected_pool_id(Some(pool_id.to_string())).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{raw_pool, MockApi};
    use crate::shared::types::RawPool;

    fn ready(state: ListState) -> ListPage {
        match state {
            ListState::Ready(page) => page,
            other => panic!("expected ready list, got {:?}", other),
        }
    }

    fn view_with(pools: Vec<RawPool>) -> (PoolListView, SelectionStore) {
        let store = PoolDataStore::new(Arc::new(MockApi::with_pools(pools)));
        let selection = SelectionStore::new();
        (PoolListView::new(store, selection.clone(), 2), selection)
    }

    #[tokio::test]
    async fn test_rows_are_formatted() {
        let (mut view, _) = view_with(vec![raw_pool("a", "USDC", "aave", "Ethereum", 12.5, 10.0, 5.0)]);
        view.load().await;
        let page = ready(view.state().await);
        assert_eq!(page.rows[0].apy, "12.50%");
        assert_eq!(page.rows[0].mu, "10.00%");
        assert_eq!(page.rows[0].sigma, "5.00%");
        assert_eq!(page.rows[0].sharpe_ratio, "2.00");
        assert!(!page.rows[0].low_sharpe);
    }

    #[tokio::test]
    async fn test_chain_filter_end_to_end() {
        let (mut view, _) = view_with(vec![
            raw_pool("a", "USDC", "aave", "ethereum", 1.0, 1.0, 1.0),
            raw_pool("b", "USDC", "aave", "polygon", 1.0, 1.0, 1.0),
            raw_pool("c", "USDC", "aave", "ethereum", 1.0, 1.0, 1.0),
        ]);
        view.load().await;
        view.set_chain_filter("ethereum");
        let page = ready(view.state().await);
        let ids: Vec<&str> = page.rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_token_filter_resets_page_three() {
        let pools = (0..120).map(|i| raw_pool(&format!("p{}", i), "USDC", "aave", "Ethereum", 1.0, 1.0, 1.0)).collect();
        let (mut view, _) = view_with(pools);
        view.load().await;

        view.set_page(3);
        let page = ready(view.state().await);
        assert_eq!(page.rows.len(), 20);
        assert_eq!(page.rows[0].id, "p100");

        view.set_token_filter("usd");
        assert_eq!(view.query().page, 1);
        let page = ready(view.state().await);
        assert_eq!(page.rows.len(), 50);
        assert_eq!(page.page_count, 3);
    }

    #[tokio::test]
    async fn test_next_page_stops_at_last_page() {
        let pools = (0..60).map(|i| raw_pool(&format!("p{}", i), "USDC", "aave", "Ethereum", 1.0, 1.0, 1.0)).collect();
        let (mut view, _) = view_with(pools);
        view.load().await;

        view.next_page().await;
        view.next_page().await;
        assert_eq!(view.query().page, 2);
        view.prev_page();
        view.prev_page();
        assert_eq!(view.query().page, 1);
    }

    #[tokio::test]
    async fn test_failure_without_snapshot_is_failed_state() {
        let store = PoolDataStore::new(Arc::new(MockApi::default()));
        let mut view = PoolListView::new(store, SelectionStore::new(), 2);
        view.load().await;
        assert!(matches!(view.state().await, ListState::Failed { .. }));
    }

    #[tokio::test]
    async fn test_select_row_records_selection() {
        let (mut view, selection) = view_with(vec![
            raw_pool("a", "USDC", "aave", "Ethereum", 5.0, 1.0, 1.0),
            raw_pool("b", "DAI", "maker", "Ethereum", 20.0, 1.0, 1.0),
        ]);
        view.load().await;
        view.toggle_sort(SortKey::Apy);

        assert_eq!(view.select_row(0).await.as_deref(), Some("b"));
        assert_eq!(selection.selected_pool_id().await.as_deref(), Some("b"));
        assert_eq!(view.select_row(5).await, None);
        assert_eq!(selection.selected_pool_id().await.as_deref(), Some("b"));
    }
}
