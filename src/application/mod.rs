//! Application layer - stores, view models and CLI use cases

pub mod commands;
pub mod data_store;
pub mod history;
pub mod pool_detail;
pub mod pool_list;
pub mod report;
pub mod selection;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;

pub use commands::{BrowseCommand, BrowseSession, Cli, CommandExecutor, Commands};
pub use data_store::PoolDataStore;
pub use history::{HistoryKey, HistoryLoader, HistoryState};
pub use pool_detail::{DetailState, PoolDetail, PoolDetailView};
pub use pool_list::{ListPage, ListState, PoolListView, PoolRow};
pub use selection::SelectionStore;
pub use services::DashboardService;
