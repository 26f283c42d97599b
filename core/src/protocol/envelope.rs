//! Wire envelope definitions and the JSON codec

use serde::{Deserialize, Serialize};

use crate::protocol::constants::MAX_MESSAGE_SIZE;
use crate::{Error, Result};

/// All envelopes exchanged over the sync connection
///
/// The wire format is a JSON object tagged by `type`, matching what the
/// desktop host speaks: `pairing_request`, `pairing_response`,
/// `clipboard_update`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Envelope {
    /// Client presents its one-time code right after the socket opens
    PairingRequest { code: String, device: String },

    /// Host verdict on the pairing request
    PairingResponse {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// Clipboard content moving in either direction
    ///
    /// Host-originated updates carry `source` and may omit `timestamp`,
    /// so both are optional on decode and absent fields stay off the wire.
    ClipboardUpdate {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
    },

    /// Tag we do not recognize; decodes cleanly for forward compatibility
    #[serde(other)]
    Unknown,
}

impl Envelope {
    /// Build an outbound clipboard update stamped with the local clock
    pub fn clipboard_update(text: impl Into<String>) -> Self {
        Envelope::ClipboardUpdate {
            text: text.into(),
            timestamp: Some(unix_timestamp()),
            source: None,
        }
    }

    /// Serialize to JSON bytes for the wire
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Deserialize from wire bytes
    ///
    /// Malformed input is a typed failure, never a panic; the connection
    /// layer drops and logs rather than tearing down the link.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > MAX_MESSAGE_SIZE {
            return Err(Error::InvalidMessage(format!(
                "message too large: {} bytes (max {})",
                bytes.len(),
                MAX_MESSAGE_SIZE
            )));
        }
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Seconds since the Unix epoch on the sender's clock
///
/// Receivers treat this as a debugging hint only.
fn unix_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
