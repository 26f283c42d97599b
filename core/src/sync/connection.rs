//! Single-link connection manager and pairing handshake
//!
//! Owns the one logical connection to the paired host. Opening a new link
//! always closes the previous one first; a generation counter keeps a
//! stale pump from clobbering the link that replaced it. Nothing here
//! retries: reconnection is the caller's decision, made with a fresh scan
//! or an explicit reconnect.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use crate::clipboard::Clipboard;
use crate::engine::EngineEvent;
use crate::protocol::Envelope;
use crate::state::{ConnectionStatus, SharedState};
use crate::transport::{LinkEvent, Transport, TransportSink};
use crate::Result;

struct ActiveLink {
    sink: Box<dyn TransportSink>,
    generation: u64,
    pump: Option<tokio::task::JoinHandle<()>>,
}

/// Owns the single live connection and routes its traffic
#[derive(Clone)]
pub struct ConnectionManager {
    transport: Arc<dyn Transport>,
    clipboard: Arc<dyn Clipboard>,
    state: SharedState,
    events: mpsc::Sender<EngineEvent>,
    platform: String,
    link: Arc<Mutex<Option<ActiveLink>>>,
    generation: Arc<AtomicU64>,
}

impl ConnectionManager {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        clipboard: Arc<dyn Clipboard>,
        state: SharedState,
        events: mpsc::Sender<EngineEvent>,
        platform: String,
    ) -> Self {
        Self {
            transport,
            clipboard,
            state,
            events,
            platform,
            link: Arc::new(Mutex::new(None)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Open a fresh link to `endpoint` and start the pairing handshake
    ///
    /// The connection is not considered paired until the host answers the
    /// `PairingRequest`; status moves `Connecting` here and `Connected`
    /// only in the inbound path.
    pub async fn connect(&self, endpoint: &str, code: &str) -> Result<()> {
        let mut slot = self.link.lock().await;
        if let Some(old) = slot.take() {
            Self::shutdown_link(old).await;
            tracing::debug!("closed previous connection");
        }

        self.state.set_target(endpoint, code).await;
        self.transition(ConnectionStatus::Connecting).await;

        let mut opened = match self.transport.open(endpoint).await {
            Ok(l) => l,
            Err(e) => {
                self.transition(ConnectionStatus::Disconnected).await;
                return Err(e);
            }
        };

        let request = Envelope::PairingRequest {
            code: code.to_string(),
            device: self.platform.clone(),
        };
        let frame = request.to_bytes()?;
        if let Err(e) = opened.sink.send(frame).await {
            opened.sink.close().await;
            self.transition(ConnectionStatus::Disconnected).await;
            return Err(e);
        }
        tracing::info!("sent pairing request to {}", endpoint);

        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let manager = self.clone();
        let mut inbound = opened.events;
        let pump = tokio::spawn(async move {
            while let Some(event) = inbound.recv().await {
                match event {
                    LinkEvent::Message(bytes) => manager.on_frame(generation, &bytes).await,
                    LinkEvent::Closed => {
                        tracing::info!("host closed the connection");
                        manager.teardown(generation).await;
                        break;
                    }
                    LinkEvent::Error(e) => {
                        tracing::warn!("transport error: {}", e);
                        manager.teardown(generation).await;
                        break;
                    }
                }
            }
        });

        // Stored before the lock is released, so a terminal event arriving
        // immediately still finds its own generation here.
        *slot = Some(ActiveLink {
            sink: opened.sink,
            generation,
            pump: Some(pump),
        });
        Ok(())
    }

    /// Best-effort send of a local clipboard change
    ///
    /// Returns whether a send was attempted. Nothing is queued while
    /// disconnected; a missed update is acceptable.
    pub async fn send(&self, text: &str) -> bool {
        if self.state.status().await == ConnectionStatus::Disconnected {
            return false;
        }

        let mut slot = self.link.lock().await;
        let Some(active) = slot.as_mut() else {
            return false;
        };
        let generation = active.generation;

        let envelope = Envelope::clipboard_update(text);
        let frame = match envelope.to_bytes() {
            Ok(f) => f,
            Err(e) => {
                tracing::error!("failed to encode clipboard update: {}", e);
                return false;
            }
        };

        match active.sink.send(frame).await {
            Ok(()) => {
                drop(slot);
                let _ = self
                    .events
                    .send(EngineEvent::ClipboardSent {
                        text: text.to_string(),
                    })
                    .await;
                true
            }
            Err(e) => {
                tracing::warn!("send failed: {}", e);
                drop(slot);
                self.teardown(generation).await;
                true
            }
        }
    }

    /// Close the live link, if any; safe to call at any time
    pub async fn close(&self) {
        let old = self.link.lock().await.take();
        if let Some(old) = old {
            Self::shutdown_link(old).await;
            tracing::debug!("connection closed");
        }
        self.transition(ConnectionStatus::Disconnected).await;
    }

    async fn shutdown_link(mut old: ActiveLink) {
        old.sink.close().await;
        if let Some(pump) = old.pump.take() {
            pump.abort();
        }
    }

    /// Drop the link this pump belongs to, unless a newer one replaced it
    async fn teardown(&self, generation: u64) {
        let mut slot = self.link.lock().await;
        if slot.as_ref().map(|a| a.generation) != Some(generation) {
            return;
        }
        if let Some(mut old) = slot.take() {
            old.sink.close().await;
            // the pump is the task running this; let it finish on its own
            old.pump = None;
        }
        drop(slot);
        self.transition(ConnectionStatus::Disconnected).await;
    }

    async fn on_frame(&self, generation: u64, bytes: &[u8]) {
        let envelope = match Envelope::from_bytes(bytes) {
            Ok(e) => e,
            Err(e) => {
                // Includes the host's bare status acks; never fatal to the link
                tracing::debug!("dropping undecodable frame: {}", e);
                return;
            }
        };
        self.on_envelope(generation, envelope).await;
    }

    async fn on_envelope(&self, generation: u64, envelope: Envelope) {
        match envelope {
            Envelope::PairingResponse { success: true, message } => {
                tracing::info!(
                    "pairing accepted{}",
                    message.map(|m| format!(": {}", m)).unwrap_or_default()
                );
                self.transition(ConnectionStatus::Connected).await;
            }
            Envelope::PairingResponse { success: false, message } => {
                let reason = message.unwrap_or_else(|| "pairing rejected".to_string());
                tracing::warn!("pairing rejected: {}", reason);
                let _ = self
                    .events
                    .send(EngineEvent::PairingRejected { reason })
                    .await;
                // taken down via the generation path: the pump is the task
                // running this handler and must not abort itself
                self.teardown(generation).await;
            }
            Envelope::ClipboardUpdate { text, source, .. } => {
                if text.is_empty() || text == self.state.last_received().await {
                    return;
                }
                if let Err(e) = self.clipboard.write(&text) {
                    tracing::warn!("clipboard write failed: {}", e);
                }
                self.state.record_received(&text).await;
                let _ = self
                    .events
                    .send(EngineEvent::ClipboardReceived { text, source })
                    .await;
            }
            Envelope::PairingRequest { .. } => {
                // host-side message; nothing for the client to do
                tracing::debug!("ignoring pairing request from host");
            }
            Envelope::Unknown => {
                tracing::debug!("ignoring envelope with unknown type");
            }
        }
    }

    async fn transition(&self, status: ConnectionStatus) {
        if self.state.set_status(status).await {
            let _ = self.events.send(EngineEvent::StatusChanged(status)).await;
        }
    }
}
