//! Clipboard polling watchers
//!
//! One tick body serves both the foreground and the background watcher;
//! the lifecycle coordinator decides which instance is live and which
//! driver runs it. Each watcher owns its own notion of the last content it
//! is aware of, updated both when it sends and when a remote update lands,
//! so a just-applied inbound value is never echoed back out.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::clipboard::Clipboard;
use crate::state::SharedState;
use crate::sync::connection::ConnectionManager;
use crate::task::{TaskDriver, TaskHandle};

/// Periodic clipboard sampler; at most one instance is live at a time
pub struct ClipboardWatcher {
    label: &'static str,
    clipboard: Arc<dyn Clipboard>,
    conn: ConnectionManager,
    state: SharedState,
    period: Duration,
    last_observed: String,
    reconciled: String,
}

impl ClipboardWatcher {
    pub fn new(
        label: &'static str,
        clipboard: Arc<dyn Clipboard>,
        conn: ConnectionManager,
        state: SharedState,
        period: Duration,
    ) -> Self {
        Self {
            label,
            clipboard,
            conn,
            state,
            period,
            last_observed: String::new(),
            reconciled: String::new(),
        }
    }

    /// One poll of the local clipboard
    pub async fn tick(&mut self) {
        // Fold in whatever the connection applied since the last tick, so
        // a remote update is observed rather than re-sent.
        let applied = self.state.last_received().await;
        if applied != self.reconciled {
            self.last_observed = applied.clone();
            self.reconciled = applied;
        }

        let text = match self.clipboard.read() {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!("{} watcher: clipboard read failed: {}", self.label, e);
                return;
            }
        };

        if text.is_empty() || text == self.last_observed {
            return;
        }

        // A freshly started instance must not re-send what an earlier one
        // already propagated.
        if text == self.state.last_sent().await {
            self.last_observed = text;
            return;
        }

        if self.conn.send(&text).await {
            tracing::debug!("{} watcher: sent {} bytes", self.label, text.len());
            self.state.record_sent(&text).await;
        }
        self.last_observed = text;
    }

    /// Hand the watcher loop to a driver
    ///
    /// The returned handle's `stop` is effective before the next tick: the
    /// live flag is consulted before every sample, never after.
    pub fn start(mut self, driver: &dyn TaskDriver) -> Box<dyn TaskHandle> {
        let live = Arc::new(AtomicBool::new(true));
        let flag = live.clone();
        let label = self.label;

        let work = Box::pin(async move {
            let mut ticker = tokio::time::interval(self.period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // interval fires immediately; a fresh watcher samples after one
            // full period instead
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if !flag.load(Ordering::Acquire) {
                    break;
                }
                self.tick().await;
            }
            tracing::debug!("{} watcher stopped", label);
        });

        driver.start(work, live)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    use crate::engine::EngineEvent;
    use crate::protocol::Envelope;
    use crate::state::ConnectionStatus;
    use crate::task::TokioDriver;
    use crate::testing::{MemoryClipboard, MockTransport};

    async fn connected_harness() -> (
        ClipboardWatcher,
        MockTransport,
        MemoryClipboard,
        SharedState,
        mpsc::Receiver<EngineEvent>,
    ) {
        let transport = MockTransport::new();
        let clipboard = MemoryClipboard::new();
        let state = SharedState::new();
        let (tx, rx) = mpsc::channel(64);
        let conn = ConnectionManager::new(
            Arc::new(transport.clone()),
            Arc::new(clipboard.clone()),
            state.clone(),
            tx,
            "ios".to_string(),
        );

        conn.connect("ws://host/dev", "1234").await.unwrap();
        transport
            .last_link()
            .push_envelope(&Envelope::PairingResponse {
                success: true,
                message: None,
            })
            .await;
        while state.status().await != ConnectionStatus::Connected {
            tokio::task::yield_now().await;
        }

        let watcher = ClipboardWatcher::new(
            "foreground",
            Arc::new(clipboard.clone()),
            conn,
            state.clone(),
            Duration::from_secs(1),
        );
        (watcher, transport, clipboard, state, rx)
    }

    fn outbound_texts(transport: &MockTransport) -> Vec<String> {
        transport
            .last_link()
            .sent_envelopes()
            .into_iter()
            .filter_map(|e| match e {
                Envelope::ClipboardUpdate { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_change_is_sent_exactly_once() {
        let (mut watcher, transport, clipboard, state, _rx) = connected_harness().await;

        clipboard.set("hello");
        watcher.tick().await;
        watcher.tick().await;
        watcher.tick().await;

        assert_eq!(outbound_texts(&transport), vec!["hello".to_string()]);
        assert_eq!(state.snapshot().await.last_sent, "hello");
    }

    #[tokio::test]
    async fn test_empty_clipboard_is_ignored() {
        let (mut watcher, transport, _clipboard, _state, _rx) = connected_harness().await;

        watcher.tick().await;

        assert!(outbound_texts(&transport).is_empty());
    }

    #[tokio::test]
    async fn test_inbound_update_is_not_echoed() {
        let (mut watcher, transport, clipboard, _state, mut rx) = connected_harness().await;

        transport
            .last_link()
            .push_envelope(&Envelope::ClipboardUpdate {
                text: "world".to_string(),
                timestamp: None,
                source: Some("desktop".to_string()),
            })
            .await;
        loop {
            match rx.recv().await {
                Some(EngineEvent::ClipboardReceived { .. }) => break,
                Some(_) => continue,
                None => panic!("event stream ended"),
            }
        }
        assert_eq!(clipboard.get(), "world");

        watcher.tick().await;
        watcher.tick().await;
        watcher.tick().await;

        assert!(outbound_texts(&transport).is_empty());
    }

    #[tokio::test]
    async fn test_fresh_local_change_after_inbound_is_sent() {
        let (mut watcher, transport, clipboard, _state, mut rx) = connected_harness().await;

        transport
            .last_link()
            .push_envelope(&Envelope::ClipboardUpdate {
                text: "world".to_string(),
                timestamp: None,
                source: None,
            })
            .await;
        loop {
            match rx.recv().await {
                Some(EngineEvent::ClipboardReceived { .. }) => break,
                Some(_) => continue,
                None => panic!("event stream ended"),
            }
        }

        watcher.tick().await;
        clipboard.set("typed locally");
        watcher.tick().await;

        assert_eq!(outbound_texts(&transport), vec!["typed locally".to_string()]);
    }

    #[tokio::test]
    async fn test_replacement_instance_does_not_resend() {
        let (mut watcher, transport, clipboard, state, _rx) = connected_harness().await;

        clipboard.set("hello");
        watcher.tick().await;
        assert_eq!(outbound_texts(&transport), vec!["hello".to_string()]);

        // the lifecycle coordinator swaps instances on phase changes
        let mut replacement = ClipboardWatcher::new(
            "background",
            watcher.clipboard.clone(),
            watcher.conn.clone(),
            state,
            watcher.period,
        );
        replacement.tick().await;
        replacement.tick().await;

        assert_eq!(outbound_texts(&transport), vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn test_clipboard_failure_skips_tick_and_recovers() {
        let (mut watcher, transport, clipboard, _state, _rx) = connected_harness().await;

        clipboard.set("hello");
        clipboard.set_failing(true);
        watcher.tick().await;
        assert!(outbound_texts(&transport).is_empty());

        clipboard.set_failing(false);
        watcher.tick().await;
        assert_eq!(outbound_texts(&transport), vec!["hello".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_takes_effect_before_next_tick() {
        let (watcher, transport, clipboard, _state, _rx) = connected_harness().await;
        let driver = TokioDriver;

        let handle = watcher.start(&driver);
        // let the loop register its timer before moving the clock
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
        clipboard.set("first");
        tokio::time::advance(Duration::from_millis(1100)).await;
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
        assert_eq!(outbound_texts(&transport), vec!["first".to_string()]);

        handle.stop();
        clipboard.set("second");
        tokio::time::advance(Duration::from_secs(3)).await;
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }

        assert_eq!(outbound_texts(&transport), vec!["first".to_string()]);
        assert!(!handle.is_live());
    }
}
