//! Clipbeam Core - pairing + clipboard-sync protocol engine
//!
//! This library is the client half of a QR-paired clipboard bridge: it
//! decodes a scanned pairing URL, holds one persistent connection to the
//! desktop host, completes the pairing-code handshake, and mirrors
//! plain-text clipboard changes in both directions with loop suppression.

pub mod clipboard;
pub mod engine;
pub mod lifecycle;
pub mod protocol;
pub mod state;
pub mod sync;
pub mod task;
pub mod transport;

mod error;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Error, Result};

/// Configuration for the sync engine
#[derive(Debug, Clone)]
pub struct Config {
    /// Device name shown to presentation
    pub device_name: String,
    /// Platform tag sent in the pairing request's `device` field
    pub platform: String,
    /// Clipboard poll period for both watchers
    pub poll_interval: std::time::Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device_name: default_device_name(),
            platform: std::env::consts::OS.to_string(),
            poll_interval: std::time::Duration::from_millis(
                protocol::constants::POLL_INTERVAL_MS,
            ),
        }
    }
}

fn default_device_name() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "clipbeam-device".to_string())
}

// Re-export key types for convenience
pub use engine::{EngineEvent, SyncEngine};
pub use lifecycle::AppPhase;
pub use protocol::{Envelope, PairingPayload};
pub use state::{ConnectionStatus, SyncState};
