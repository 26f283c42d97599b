//! In-crate test doubles shared by the unit tests
//!
//! A string-backed clipboard and a script-able transport so the engine's
//! behavior can be exercised without a display server or a socket.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::clipboard::Clipboard;
use crate::protocol::Envelope;
use crate::transport::{LinkEvent, Transport, TransportLink, TransportSink};
use crate::{Error, Result};

/// Clipboard backed by a plain string, with a failure switch
#[derive(Clone, Default)]
pub(crate) struct MemoryClipboard {
    text: Arc<Mutex<String>>,
    failing: Arc<Mutex<bool>>,
}

impl MemoryClipboard {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set(&self, text: &str) {
        *self.text.lock().unwrap() = text.to_string();
    }

    pub(crate) fn get(&self) -> String {
        self.text.lock().unwrap().clone()
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }
}

impl Clipboard for MemoryClipboard {
    fn read(&self) -> Result<String> {
        if *self.failing.lock().unwrap() {
            return Err(Error::Clipboard("simulated read failure".to_string()));
        }
        Ok(self.get())
    }

    fn write(&self, text: &str) -> Result<()> {
        if *self.failing.lock().unwrap() {
            return Err(Error::Clipboard("simulated write failure".to_string()));
        }
        self.set(text);
        Ok(())
    }
}

/// One link handed out by `MockTransport`
pub(crate) struct MockLink {
    pub(crate) url: String,
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
    closed: Arc<Mutex<bool>>,
    inbound: mpsc::Sender<LinkEvent>,
}

impl MockLink {
    pub(crate) fn sent_envelopes(&self) -> Vec<Envelope> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|frame| Envelope::from_bytes(frame).expect("mock captured invalid frame"))
            .collect()
    }

    pub(crate) fn is_closed(&self) -> bool {
        *self.closed.lock().unwrap()
    }

    /// Inject a raw link event, as the transport would
    pub(crate) async fn push(&self, event: LinkEvent) {
        let _ = self.inbound.send(event).await;
    }

    /// Inject an inbound envelope from the host
    pub(crate) async fn push_envelope(&self, envelope: &Envelope) {
        self.push(LinkEvent::Message(
            envelope.to_bytes().expect("mock envelope encodes"),
        ))
        .await;
    }
}

/// Transport double recording every opened link
#[derive(Clone, Default)]
pub(crate) struct MockTransport {
    links: Arc<Mutex<Vec<Arc<MockLink>>>>,
    fail_next: Arc<Mutex<bool>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Make the next `open` fail with a transport error
    pub(crate) fn fail_next_open(&self) {
        *self.fail_next.lock().unwrap() = true;
    }

    pub(crate) fn links(&self) -> Vec<Arc<MockLink>> {
        self.links.lock().unwrap().clone()
    }

    pub(crate) fn last_link(&self) -> Arc<MockLink> {
        self.links
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no link opened")
    }

    pub(crate) fn open_count(&self) -> usize {
        self.links.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn open(&self, url: &str) -> Result<TransportLink> {
        if std::mem::take(&mut *self.fail_next.lock().unwrap()) {
            return Err(Error::Transport("mock open refused".to_string()));
        }

        let (inbound_tx, inbound_rx) = mpsc::channel(32);
        let link = Arc::new(MockLink {
            url: url.to_string(),
            sent: Arc::new(Mutex::new(Vec::new())),
            closed: Arc::new(Mutex::new(false)),
            inbound: inbound_tx,
        });
        self.links.lock().unwrap().push(link.clone());

        Ok(TransportLink {
            sink: Box::new(MockSink { link }),
            events: inbound_rx,
        })
    }
}

struct MockSink {
    link: Arc<MockLink>,
}

#[async_trait]
impl TransportSink for MockSink {
    async fn send(&mut self, payload: Vec<u8>) -> Result<()> {
        if self.link.is_closed() {
            return Err(Error::Transport("link closed".to_string()));
        }
        self.link.sent.lock().unwrap().push(payload);
        Ok(())
    }

    async fn close(&mut self) {
        *self.link.closed.lock().unwrap() = true;
    }
}
