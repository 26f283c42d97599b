//! Process-wide sync state shared between the connection and the watchers

use std::sync::Arc;

use tokio::sync::RwLock;

/// Connection lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Snapshot of the engine's observable state
#[derive(Debug, Clone, Default)]
pub struct SyncState {
    pub status: ConnectionStatus,
    pub last_sent: String,
    pub last_received: String,
    pub endpoint: String,
    pub code: String,
}

/// Shared handle to the single `SyncState` instance
///
/// Mutated only by the connection manager and the watcher ticks;
/// presentation reads owned snapshots rather than ambient globals.
#[derive(Clone, Default)]
pub struct SharedState {
    inner: Arc<RwLock<SyncState>>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> SyncState {
        self.inner.read().await.clone()
    }

    pub async fn status(&self) -> ConnectionStatus {
        self.inner.read().await.status
    }

    /// Returns true when the status actually changed
    pub async fn set_status(&self, status: ConnectionStatus) -> bool {
        let mut state = self.inner.write().await;
        if state.status == status {
            return false;
        }
        state.status = status;
        true
    }

    pub async fn set_target(&self, endpoint: &str, code: &str) {
        let mut state = self.inner.write().await;
        state.endpoint = endpoint.to_string();
        state.code = code.to_string();
    }

    pub async fn record_sent(&self, text: &str) {
        self.inner.write().await.last_sent = text.to_string();
    }

    pub async fn record_received(&self, text: &str) {
        self.inner.write().await.last_received = text.to_string();
    }

    pub async fn last_received(&self) -> String {
        self.inner.read().await.last_received.clone()
    }

    pub async fn last_sent(&self) -> String {
        self.inner.read().await.last_sent.clone()
    }
}
