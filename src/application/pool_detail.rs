//! Pool detail view model: metrics, protocol metadata and history charts

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::pool::SharpeRatio;
use crate::shared::types::{Pool, PoolHistoryPoint, ProtocolData, Raise};
use crate::shared::utils::{format_as_percentage_with, format_unix_date, format_usd_billions, month_day_label};
use super::history::{HistoryKey, HistoryLoader, HistoryState};
use super::{PoolDataStore, SelectionStore};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricBar {
    pub label: &'static str,
    pub value: f64,
    pub formatted: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub timestamp: i64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub title: &'static str,
    pub points: Vec<ChartPoint>,
}

impl ChartSeries {
    /// Points missing a timestamp or the sampled value are skipped
    fn from_history(
        title: &'static str,
        history: &[PoolHistoryPoint],
        sample: impl Fn(&PoolHistoryPoint) -> Option<f64>,
    ) -> Self {
        let points = history
            .iter()
            .filter_map(|p| {
                let timestamp = p.timestamp?;
                let value = sample(p)?;
                Some(ChartPoint { label: month_day_label(timestamp), timestamp, value })
            })
            .collect();
        Self { title, points }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryView {
    pub loading: bool,
    pub tvl: ChartSeries,
    pub apy: ChartSeries,
}

impl HistoryView {
    fn from_state(state: &HistoryState) -> Self {
        Self {
            loading: state.loading,
            tvl: ChartSeries::from_history("TVL", &state.points, |p| p.tvl_usd),
            apy: ChartSeries::from_history("APY", &state.points, |p| p.apy),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tvl.points.is_empty() && self.apy.points.is_empty()
    }
}

/// Protocol fields as displayed; "N/A" while not loaded
#[derive(Debug, Clone, Serialize)]
pub struct ProtocolSummary {
    pub loaded: bool,
    pub tvl: String,
    pub listed_at: String,
    pub audits: String,
    pub hallmark_count: usize,
    pub raise_count: usize,
    pub mcap: String,
    pub hallmarks: Vec<String>,
    pub raises: Vec<Raise>,
}

impl ProtocolSummary {
    fn from_data(data: Option<&ProtocolData>) -> Self {
        Self {
            loaded: data.is_some(),
            tvl: format_usd_billions(data.and_then(|d| d.tvl)),
            listed_at: format_unix_date(data.and_then(|d| d.listed_at)),
            audits: match data.and_then(|d| d.audits) {
                Some(n) if n > 0 => n.to_string(),
                _ => "N/A".to_string(),
            },
            hallmark_count: data.map_or(0, |d| d.hallmarks.len()),
            raise_count: data.map_or(0, |d| d.raises.len()),
            mcap: format_usd_billions(data.and_then(|d| d.mcap)),
            hallmarks: data.map(|d| d.hallmarks.clone()).unwrap_or_default(),
            raises: data.map(|d| d.raises.clone()).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PoolDetail {
    pub pool: Pool,
    pub apy: String,
    pub mu: String,
    pub sigma: String,
    pub sharpe_ratio: String,
    pub low_sharpe: bool,
    pub comparison: Vec<MetricBar>,
    pub protocol: ProtocolSummary,
    pub history: HistoryView,
    pub store_error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DetailState {
    NoSelection,
    NotFound { pool_id: String },
    Ready(Box<PoolDetail>),
}

/// Detail view for the selected pool
#[derive(Clone)]
pub struct PoolDetailView {
    store: PoolDataStore,
    selection: SelectionStore,
    history: HistoryLoader,
    decimals: usize,
}

impl PoolDetailView {
    pub fn new(store: PoolDataStore, selection: SelectionStore, history: HistoryLoader, decimals: usize) -> Self {
        Self { store, selection, history, decimals }
    }

    /// Resolve the selected pool from the cache and trigger its protocol and history fetches.
    /// An unknown id never touches the network.
    pub async fn resolve(&self) -> DetailState {
        let Some(pool_id) = self.selection.selected_pool_id().await else {
            return DetailState::NoSelection;
        };

        let Some(pool) = self.store.find_pool(&pool_id).await else {
            warn!("⚠️ Pool {} not found in cache", pool_id);
            self.history.clear();
            return DetailState::NotFound { pool_id };
        };

        info!("📊 Resolving detail for {} ({})", pool.id, pool.project);
        self.history.load(HistoryKey::for_pool(&pool));
        self.store.fetch_protocol_data(&pool.project).await;

        if let Some(ratio) = SharpeRatio::of(&pool).value() {
            self.store.update_pool_metrics(&pool.id, pool.sigma, ratio).await;
        }

        DetailState::Ready(Box::new(self.build(pool, self.history.snapshot()).await))
    }

    /// Resolve, then wait for the history request to finish
    pub async fn resolve_settled(&self) -> DetailState {
        match self.resolve().await {
            DetailState::Ready(detail) => {
                let history = self.history.settled().await;
                DetailState::Ready(Box::new(self.build(detail.pool, history).await))
            }
            other => other,
        }
    }

    async fn build(&self, pool: Pool, history: HistoryState) -> PoolDetail {
        let ratio = SharpeRatio::of(&pool);
        let protocol = self.store.protocol_data(&pool.project).await;
        let pct = |v: f64| format_as_percentage_with(v / 100.0, self.decimals);

        PoolDetail {
            apy: pct(pool.apy),
            mu: pct(pool.mu),
            sigma: pct(pool.sigma),
            sharpe_ratio: ratio.to_string(),
            low_sharpe: ratio.is_low(),
            comparison: vec![
                MetricBar { label: "APY", value: pool.apy, formatted: pct(pool.apy) },
                MetricBar { label: "Avg Return", value: pool.mu, formatted: pct(pool.mu) },
                MetricBar { label: "Volatility", value: pool.sigma, formatted: pct(pool.sigma) },
            ],
            protocol: ProtocolSummary::from_data(protocol.as_ref()),
            history: HistoryView::from_state(&history),
            store_error: self.store.error().await,
            pool,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{point, raw_pool, MockApi};
    use std::sync::Arc;
    use std::time::Duration;

    async fn setup(api: MockApi) -> (PoolDetailView, SelectionStore, Arc<MockApi>) {
        let api = Arc::new(api);
        let store = PoolDataStore::new(api.clone());
        store.fetch_pools().await;
        let selection = SelectionStore::new();
        let view = PoolDetailView::new(store, selection.clone(), HistoryLoader::new(api.clone()), 2);
        (view, selection, api)
    }

    fn ready(state: DetailState) -> PoolDetail {
        match state {
            DetailState::Ready(detail) => *detail,
            other => panic!("expected detail, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_no_selection() {
        let (view, _, _) = setup(MockApi::with_pools(vec![])).await;
        assert!(matches!(view.resolve().await, DetailState::NoSelection));
    }

    #[tokio::test]
    async fn test_unknown_pool_is_not_found_without_network() {
        let (view, selection, api) = setup(MockApi::with_pools(vec![raw_pool("a", "USDC", "aave", "Ethereum", 1.0, 1.0, 1.0)])).await;
        selection.set_selected_pool_id(Some("zzz".to_string())).await;

        match view.resolve().await {
            DetailState::NotFound { pool_id } => assert_eq!(pool_id, "zzz"),
            other => panic!("expected not found, got {:?}", other),
        }
        assert_eq!(api.protocol_calls(), 0);
        assert_eq!(api.history_calls(), 0);
    }

    #[tokio::test]
    async fn test_detail_joins_protocol_and_history() {
        let api = MockApi::with_pools(vec![raw_pool("a", "USDC", "aave", "Ethereum", 12.0, 10.0, 5.0)])
            .with_protocol("aave", ProtocolData {
                tvl: Some(2_500_000_000.0),
                listed_at: Some(1_700_000_000),
                audits: Some(2),
                hallmarks: vec!["v3 launch".to_string()],
                raises: vec![],
                mcap: None,
            })
            .with_history("USDC", Duration::from_millis(5), vec![
                point(1_700_000_000, 4.0, 1000.0),
                PoolHistoryPoint { timestamp: Some(1_700_086_400), apy: None, tvl_usd: Some(1100.0) },
                PoolHistoryPoint { timestamp: None, apy: Some(9.0), tvl_usd: Some(9.0) },
            ]);
        let (view, selection, _) = setup(api).await;
        selection.set_selected_pool_id(Some("a".to_string())).await;

        let detail = ready(view.resolve_settled().await);
        assert_eq!(detail.sharpe_ratio, "2.00");
        assert!(!detail.low_sharpe);
        assert_eq!(detail.apy, "12.00%");
        assert_eq!(detail.protocol.tvl, "$2.50B");
        assert_eq!(detail.protocol.listed_at, "2023-11-14");
        assert_eq!(detail.protocol.audits, "2");
        assert_eq!(detail.protocol.mcap, "N/A");
        assert_eq!(detail.protocol.hallmark_count, 1);
        assert_eq!(detail.comparison.len(), 3);
        assert!(!detail.history.loading);
        assert_eq!(detail.history.tvl.points.len(), 2);
        assert_eq!(detail.history.apy.points.len(), 1);
        assert_eq!(detail.history.tvl.points[1].label, "11-15");
    }

    #[tokio::test]
    async fn test_low_ratio_warning_and_metrics_recorded() {
        let api = MockApi::with_pools(vec![raw_pool("a", "USDC", "aave", "Ethereum", 5.0, 5.0, 10.0)]);
        let (view, selection, _) = setup(api).await;
        selection.set_selected_pool_id(Some("a".to_string())).await;

        let detail = ready(view.resolve_settled().await);
        assert_eq!(detail.sharpe_ratio, "0.50");
        assert!(detail.low_sharpe);
        assert_eq!(view.store.find_pool("a").await.unwrap().sharpe_ratio, Some(0.5));
    }

    #[tokio::test]
    async fn test_missing_protocol_and_history_degrade() {
        let api = MockApi::with_pools(vec![raw_pool("a", "USDC", "ghost", "Ethereum", 5.0, 5.0, 0.0)]);
        let (view, selection, _) = setup(api).await;
        selection.set_selected_pool_id(Some("a".to_string())).await;

        let detail = ready(view.resolve_settled().await);
        assert!(!detail.protocol.loaded);
        assert_eq!(detail.protocol.tvl, "N/A");
        assert_eq!(detail.protocol.audits, "N/A");
        assert!(detail.history.is_empty());
        assert!(detail.store_error.is_some());
        assert_eq!(detail.sharpe_ratio, "N/A");
        assert!(!detail.low_sharpe);
    }

    #[tokio::test]
    async fn test_revisiting_project_reuses_protocol_cache() {
        let api = MockApi::with_pools(vec![
            raw_pool("a", "USDC", "aave", "Ethereum", 1.0, 1.0, 1.0),
            raw_pool("b", "DAI", "aave", "Ethereum", 1.0, 1.0, 1.0),
        ])
        .with_protocol("aave", ProtocolData::default());
        let (view, selection, api) = setup(api).await;

        for id in ["a", "b", "a"] {
            selection.set_selected_pool_id(Some(id.to_string())).await;
            view.resolve_settled().await;
        }
        assert_eq!(api.protocol_calls(), 1);
        assert_eq!(api.history_calls(), 3);
    }
}
