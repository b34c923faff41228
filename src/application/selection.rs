//! Currently viewed pool

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Holds the selected pool id. No validation against the pool list happens here.
#[derive(Clone, Default)]
pub struct SelectionStore {
    selected: Arc<RwLock<Option<String>>>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_selected_pool_id(&self, id: Option<String>) {
        debug!("Selected pool: {:?}", id);
        *self.selected.write().await = id;
    }

    pub async fn selected_pool_id(&self) -> Option<String> {
        self.selected.read().await.clone()
    }
}
