//! Pool domain - list query engine and derived metrics

mod pool_metrics;
mod pool_query;

pub use pool_metrics::{SharpeRatio, LOW_SHARPE_THRESHOLD};
pub use pool_query::{
    filter_pools, page_count, paginate, run_query, sort_pools, PoolFilters, PoolQuery,
    PoolQueryEngine, QueryResult, SortDirection, SortKey, SortSpec, PAGE_SIZE,
};
