//! Yieldscope - DeFi yield pool dashboard
//! Built with Domain-Driven Design principles

pub mod domain;
pub mod infrastructure;
pub mod application;
pub mod shared;

// Re-export main types for convenience
pub use application::{DashboardService, PoolDataStore, PoolDetailView, PoolListView, SelectionStore};
pub use domain::pool::{PoolQuery, PoolQueryEngine, SharpeRatio};
pub use infrastructure::{LlamaApiClient, YieldsApi};
pub use shared::utils::{format_as_percentage, format_as_percentage_with};
