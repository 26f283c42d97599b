//! WebSocket transport over tokio-tungstenite
//!
//! The scanned endpoint is a `ws://` URL and the host speaks JSON text
//! frames, so the production link is a split WebSocket stream: the sink
//! half sends text frames, a spawned pump turns the read half into
//! `LinkEvent`s until the stream ends.

use async_trait::async_trait;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::{LinkEvent, Transport, TransportLink, TransportSink};
use crate::{Error, Result};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, WsMessage>;

/// Production transport speaking text-frame JSON over WebSocket
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketTransport;

#[async_trait]
impl Transport for WebSocketTransport {
    async fn open(&self, url: &str) -> Result<TransportLink> {
        let (ws_stream, _response) = connect_async(url).await.map_err(|e| {
            Error::Transport(format!("websocket connect to {} failed: {}", url, e))
        })?;
        tracing::debug!("websocket open to {}", url);

        let (ws_sink, mut ws_read) = ws_stream.split();
        let (event_tx, event_rx) = mpsc::channel(32);

        // Inbound pump: frames become link events until the stream ends
        tokio::spawn(async move {
            while let Some(frame) = ws_read.next().await {
                let event = match frame {
                    Ok(WsMessage::Text(text)) => LinkEvent::Message(text.as_bytes().to_vec()),
                    Ok(WsMessage::Binary(data)) => LinkEvent::Message(data.to_vec()),
                    Ok(WsMessage::Close(_)) => LinkEvent::Closed,
                    // Pings are answered by the library
                    Ok(WsMessage::Ping(_)) | Ok(WsMessage::Pong(_)) => continue,
                    Ok(WsMessage::Frame(_)) => continue,
                    Err(e) => LinkEvent::Error(e.to_string()),
                };
                let terminal = matches!(event, LinkEvent::Closed | LinkEvent::Error(_));
                if event_tx.send(event).await.is_err() || terminal {
                    return;
                }
            }
            let _ = event_tx.send(LinkEvent::Closed).await;
        });

        Ok(TransportLink {
            sink: Box::new(WebSocketSink { sink: ws_sink }),
            events: event_rx,
        })
    }
}

struct WebSocketSink {
    sink: WsSink,
}

#[async_trait]
impl TransportSink for WebSocketSink {
    async fn send(&mut self, payload: Vec<u8>) -> Result<()> {
        let text = String::from_utf8(payload)
            .map_err(|e| Error::Transport(format!("outbound frame is not utf-8: {}", e)))?;
        self.sink
            .send(WsMessage::text(text))
            .await
            .map_err(|e| Error::Transport(e.to_string()))
    }

    async fn close(&mut self) {
        let _ = self.sink.send(WsMessage::Close(None)).await;
        let _ = self.sink.close().await;
    }
}
