//! Per-pool history series with cancellation on identity change

use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::infrastructure::YieldsApi;
use crate::shared::types::{Pool, PoolHistoryPoint};
use crate::shared::utils::generate_id;

/// Pool identity plus the (project, chain, symbol) triple used to fetch its history
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HistoryKey {
    pub pool_id: String,
    pub project: String,
    pub chain: String,
    pub symbol: String,
}

impl HistoryKey {
    pub fn for_pool(pool: &Pool) -> Self {
        Self {
            pool_id: pool.id.clone(),
            project: pool.project.clone(),
            chain: pool.chain.clone(),
            symbol: pool.symbol.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HistoryState {
    pub key: Option<HistoryKey>,
    /// Token of the request whose response may be applied
    pub request_id: Option<String>,
    pub loading: bool,
    pub points: Vec<PoolHistoryPoint>,
}

/// Loads history for one pool at a time. Failures degrade to an empty series.
#[derive(Clone)]
pub struct HistoryLoader {
    api: Arc<dyn YieldsApi>,
    state: Arc<watch::Sender<HistoryState>>,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl HistoryLoader {
    pub fn new(api: Arc<dyn YieldsApi>) -> Self {
        let (state, _) = watch::channel(HistoryState::default());
        Self {
            api,
            state: Arc::new(state),
            task: Arc::new(Mutex::new(None)),
        }
    }

    /// Start loading `key` unless a request for it is already in flight.
    /// A settled series is never reused: loading the same pool again refetches.
    /// An in-flight request for another pool is aborted and its response discarded.
    pub fn load(&self, key: HistoryKey) {
        {
            let current = self.state.borrow();
            if current.loading && current.key.as_ref() == Some(&key) {
                debug!("History for {} already loading", key.pool_id);
                return;
            }
        }

        let mut task = self.task.lock().unwrap_or_else(|e| e.into_inner());
        self.cancel_running(&mut task);

        let request_id = generate_id();
        self.state.send_replace(HistoryState {
            key: Some(key.clone()),
            request_id: Some(request_id.clone()),
            loading: true,
            points: Vec::new(),
        });

        let api = self.api.clone();
        let state = self.state.clone();
        *task = Some(tokio::spawn(async move {
            let points = match api.fetch_pool_history(&key.project, &key.chain, &key.symbol).await {
                Ok(points) => {
                    info!("✅ Loaded {} history points for {}", points.len(), key.pool_id);
                    points
                }
                Err(e) => {
                    warn!("⚠️ No history for {}: {}", key.pool_id, e);
                    Vec::new()
                }
            };

            apply_response(&state, &request_id, &key.pool_id, points);
        }));
    }

    /// Drop any current history and cancel the in-flight request
    pub fn clear(&self) {
        let mut task = self.task.lock().unwrap_or_else(|e| e.into_inner());
        self.cancel_running(&mut task);
        self.state.send_replace(HistoryState::default());
    }

    fn cancel_running(&self, task: &mut Option<JoinHandle<()>>) {
        if let Some(handle) = task.take() {
            if !handle.is_finished() {
                info!("🛑 Cancelling stale history request");
            }
            handle.abort();
        }
    }

    pub fn snapshot(&self) -> HistoryState {
        HistoryState::clone(&self.state.borrow())
    }

    /// Wait until the current request (if any) has resolved
    pub async fn settled(&self) -> HistoryState {
        let mut rx = self.state.subscribe();
        loop {
            {
                let current = rx.borrow_and_update();
                if !current.loading {
                    return HistoryState::clone(&current);
                }
            }
            if rx.changed().await.is_err() {
                return self.snapshot();
            }
        }
    }
}

/// Store `points` only if `request_id` still owns the state
fn apply_response(
    state: &watch::Sender<HistoryState>,
    request_id: &str,
    pool_id: &str,
    points: Vec<PoolHistoryPoint>,
) -> bool {
    state.send_if_modified(|current| {
        if current.request_id.as_deref() != Some(request_id) {
            debug!("Discarding stale history response for {}", pool_id);
            return false;
        }
        current.points = points;
        current.loading = false;
        true
    })
}
