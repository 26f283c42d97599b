use thiserror::Error;

/// Clipbeam error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid pairing data: {0}")]
    InvalidPairingData(String),

    #[error("Failed to decode envelope: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Engine already started")]
    AlreadyStarted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
