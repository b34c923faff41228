//! Filter / sort / paginate projection over the cached pool list

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use crate::shared::types::Pool;

/// Fixed table page size
pub const PAGE_SIZE: usize = 50;

/// Sortable pool columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Symbol,
    Project,
    Chain,
    Apy,
    Mu,
    Sigma,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Symbol => "symbol",
            SortKey::Project => "project",
            SortKey::Chain => "chain",
            SortKey::Apy => "apy",
            SortKey::Mu => "mu",
            SortKey::Sigma => "sigma",
        }
    }

    fn compare(&self, a: &Pool, b: &Pool) -> Ordering {
        match self {
            SortKey::Symbol => locale_cmp(&a.symbol, &b.symbol),
            SortKey::Project => locale_cmp(&a.project, &b.project),
            SortKey::Chain => locale_cmp(&a.chain, &b.chain),
            SortKey::Apy => a.apy.total_cmp(&b.apy),
            SortKey::Mu => a.mu.total_cmp(&b.mu),
            SortKey::Sigma => a.sigma.total_cmp(&b.sigma),
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "symbol" | "token" => Ok(SortKey::Symbol),
            "project" => Ok(SortKey::Project),
            "chain" => Ok(SortKey::Chain),
            "apy" => Ok(SortKey::Apy),
            "mu" | "return" => Ok(SortKey::Mu),
            "sigma" | "volatility" => Ok(SortKey::Sigma),
            other => Err(format!("unknown sort key '{}' (symbol, project, chain, apy, mu, sigma)", other)),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

/// Case-insensitive substring filters; empty means no filter
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct PoolFilters {
    pub project: String,
    pub chain: String,
    pub token: String,
}

impl PoolFilters {
    pub fn matches(&self, pool: &Pool) -> bool {
        contains_ci(&pool.project, &self.project)
            && contains_ci(&pool.chain, &self.chain)
            && contains_ci(&pool.symbol, &self.token)
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Case-insensitive ordering first, lowercase before uppercase on ties.
///
/// Approximates a locale collation by comparing lowercased code points, so
/// non-ASCII symbols (`USD₮0`, accented tickers) sort after `z`.
fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| b.cmp(a))
}

/// Full query input. Any filter or sort change resets `page` to 1.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PoolQuery {
    pub filters: PoolFilters,
    pub sort: Option<SortSpec>,
    /// 1-based
    pub page: usize,
}

impl Default for PoolQuery {
    fn default() -> Self {
        Self { filters: PoolFilters::default(), sort: None, page: 1 }
    }
}

impl PoolQuery {
    pub fn set_project_filter(&mut self, text: impl Into<String>) {
        self.filters.project = text.into();
        self.page = 1;
    }

    pub fn set_chain_filter(&mut self, text: impl Into<String>) {
        self.filters.chain = text.into();
        self.page = 1;
    }

    pub fn set_token_filter(&mut self, text: impl Into<String>) {
        self.filters.token = text.into();
        self.page = 1;
    }

    pub fn set_sort(&mut self, key: SortKey, direction: SortDirection) {
        self.sort = Some(SortSpec { key, direction });
        self.page = 1;
    }

    /// Column header click: flip direction on the active key, otherwise switch key descending
    pub fn toggle_sort(&mut self, key: SortKey) {
        let direction = match self.sort {
            Some(spec) if spec.key == key => spec.direction.flip(),
            _ => SortDirection::Descending,
        };
        self.set_sort(key, direction);
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }
}

/// One page of the filtered and sorted pool list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub total_matches: usize,
    pub page: usize,
    pub page_count: usize,
    pub rows: Vec<Pool>,
}

pub fn filter_pools(pools: &[Pool], filters: &PoolFilters) -> Vec<Pool> {
    pools.iter().filter(|p| filters.matches(p)).cloned().collect()
}

/// Stable sort; ties keep their filtered order in both directions
pub fn sort_pools(pools: &mut [Pool], spec: SortSpec) {
    pools.sort_by(|a, b| {
        let ord = spec.key.compare(a, b);
        match spec.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}

pub fn page_count(total: usize) -> usize {
    total.div_ceil(PAGE_SIZE)
}

/// Rows `[(page-1)*50, page*50)`; out of range pages are empty
pub fn paginate(pools: &[Pool], page: usize) -> &[Pool] {
    let start = page.saturating_sub(1).saturating_mul(PAGE_SIZE);
    if start >= pools.len() {
        return &[];
    }
    let end = (start + PAGE_SIZE).min(pools.len());
    &pools[start..end]
}

pub fn run_query(pools: &[Pool], query: &PoolQuery) -> QueryResult {
    let mut matched = filter_pools(pools, &query.filters);
    if let Some(spec) = query.sort {
        sort_pools(&mut matched, spec);
    }

    QueryResult {
        total_matches: matched.len(),
        page: query.page,
        page_count: page_count(matched.len()),
        rows: paginate(&matched, query.page).to_vec(),
    }
}

/// Memoized projection keyed by (cache version, query)
#[derive(Debug, Default)]
pub struct PoolQueryEngine {
    memo: Option<((u64, PoolQuery), Arc<QueryResult>)>,
    recomputations: u64,
}

impl PoolQueryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project(&mut self, cache_version: u64, pools: &[Pool], query: &PoolQuery) -> Arc<QueryResult> {
        if let Some(((version, memo_query), result)) = &self.memo {
            if *version == cache_version && memo_query == query {
                return result.clone();
            }
        }

        let result = Arc::new(run_query(pools, query));
        self.recomputations += 1;
        debug!(
            "Recomputed pool view: {} matches, page {}/{}",
            result.total_matches, result.page, result.page_count
        );
        self.memo = Some(((cache_version, query.clone()), result.clone()));
        result
    }

    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }
}
