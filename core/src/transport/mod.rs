//! Transport seam: the narrow contract the engine is written against
//!
//! The engine never touches sockets directly. It opens a link through the
//! `Transport` trait and consumes `LinkEvent`s; the production
//! implementation speaks WebSocket, tests substitute an in-memory double.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::Result;

mod websocket;

pub use websocket::WebSocketTransport;

/// Event surfaced by an open link
#[derive(Debug)]
pub enum LinkEvent {
    /// A complete inbound frame
    Message(Vec<u8>),
    /// The remote side closed the link
    Closed,
    /// Transport-level failure; the link is dead
    Error(String),
}

/// Outbound half of an open link
#[async_trait]
pub trait TransportSink: Send {
    async fn send(&mut self, payload: Vec<u8>) -> Result<()>;

    /// Best-effort close; safe to call more than once
    async fn close(&mut self);
}

/// An established bidirectional link
pub struct TransportLink {
    pub sink: Box<dyn TransportSink>,
    pub events: mpsc::Receiver<LinkEvent>,
}

/// Connection factory
#[async_trait]
pub trait Transport: Send + Sync {
    async fn open(&self, url: &str) -> Result<TransportLink>;
}
