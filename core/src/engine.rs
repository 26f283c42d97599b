//! Engine facade consumed by presentation
//!
//! Presentation supplies UI events (a scan, a manual connect, a phase
//! change) and renders the event stream and state snapshots this facade
//! exposes. Everything stateful lives behind it.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use crate::clipboard::{Clipboard, SystemClipboard};
use crate::lifecycle::{AppPhase, LifecycleCoordinator};
use crate::protocol::PairingPayload;
use crate::state::{ConnectionStatus, SharedState, SyncState};
use crate::sync::connection::ConnectionManager;
use crate::task::{TaskDriver, TokioDriver};
use crate::transport::{Transport, WebSocketTransport};
use crate::{Config, Error, Result};

/// Events surfaced to presentation
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// Connection status moved
    StatusChanged(ConnectionStatus),
    /// A remote update was applied to the local clipboard
    ClipboardReceived { text: String, source: Option<String> },
    /// A local change went out
    ClipboardSent { text: String },
    /// The host refused our pairing code
    PairingRejected { reason: String },
}

/// The pairing + clipboard-sync engine
pub struct SyncEngine {
    config: Config,
    state: SharedState,
    conn: ConnectionManager,
    lifecycle: Mutex<LifecycleCoordinator>,
    events: Mutex<Option<mpsc::Receiver<EngineEvent>>>,
}

impl SyncEngine {
    /// Engine wired to the system clipboard and WebSocket transport
    pub fn new(config: Config) -> Self {
        Self::with_parts(
            config,
            Arc::new(WebSocketTransport),
            Arc::new(SystemClipboard),
            Arc::new(TokioDriver),
        )
    }

    /// Seam-injected constructor; how the tests run without sockets
    pub fn with_parts(
        config: Config,
        transport: Arc<dyn Transport>,
        clipboard: Arc<dyn Clipboard>,
        driver: Arc<dyn TaskDriver>,
    ) -> Self {
        let (tx, rx) = mpsc::channel(64);
        let state = SharedState::new();
        let conn = ConnectionManager::new(
            transport,
            clipboard.clone(),
            state.clone(),
            tx,
            config.platform.clone(),
        );
        let lifecycle = LifecycleCoordinator::new(
            clipboard,
            conn.clone(),
            state.clone(),
            config.poll_interval,
            driver,
        );
        Self {
            config,
            state,
            conn,
            lifecycle: Mutex::new(lifecycle),
            events: Mutex::new(Some(rx)),
        }
    }

    /// Start the foreground watcher and hand back the event stream
    pub async fn start(&self) -> Result<mpsc::Receiver<EngineEvent>> {
        let rx = self
            .events
            .lock()
            .await
            .take()
            .ok_or(Error::AlreadyStarted)?;
        self.lifecycle.lock().await.start_foreground();
        tracing::info!("sync engine started");
        Ok(rx)
    }

    /// Decode a scanned payload and, when it parses, begin connecting
    ///
    /// A malformed scan is reported to the caller and never reaches the
    /// transport.
    pub async fn report_scan(&self, raw: &str) -> Result<PairingPayload> {
        let payload = PairingPayload::parse(raw)?;
        self.connect(&payload.endpoint(), &payload.code).await?;
        Ok(payload)
    }

    /// Connect to an endpoint with a pairing code (manual entry path)
    pub async fn connect(&self, endpoint: &str, code: &str) -> Result<()> {
        self.conn.connect(endpoint, code).await
    }

    /// Tear down the current connection and dial again
    pub async fn reconnect(&self, endpoint: &str, code: &str) -> Result<()> {
        self.conn.close().await;
        self.conn.connect(endpoint, code).await
    }

    /// Report an app visibility change
    pub async fn set_phase(&self, phase: AppPhase) {
        self.lifecycle.lock().await.set_phase(phase).await;
    }

    pub async fn phase(&self) -> AppPhase {
        self.lifecycle.lock().await.phase()
    }

    /// Owned snapshot of the observable state
    pub async fn snapshot(&self) -> SyncState {
        self.state.snapshot().await
    }

    pub fn device_name(&self) -> &str {
        &self.config.device_name
    }

    pub fn platform(&self) -> &str {
        &self.config.platform
    }

    /// Close the connection and stop both watchers
    pub async fn close(&self) {
        self.lifecycle.lock().await.shutdown();
        self.conn.close().await;
    }
}
