//! Foreground/background lifecycle coordination
//!
//! Presentation reports visibility changes; this coordinator decides which
//! of the two watcher instances runs. Background watching is gated on an
//! established connection so nothing polls with no sync target.

use std::sync::Arc;
use std::time::Duration;

use crate::clipboard::Clipboard;
use crate::state::{ConnectionStatus, SharedState};
use crate::sync::connection::ConnectionManager;
use crate::sync::watcher::ClipboardWatcher;
use crate::task::{TaskDriver, TaskHandle};

/// App visibility phase reported by presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppPhase {
    #[default]
    Foreground,
    Background,
}

/// Starts and stops the watcher instances as the app changes phase
pub struct LifecycleCoordinator {
    phase: AppPhase,
    clipboard: Arc<dyn Clipboard>,
    conn: ConnectionManager,
    state: SharedState,
    period: Duration,
    driver: Arc<dyn TaskDriver>,
    foreground: Option<Box<dyn TaskHandle>>,
    background: Option<Box<dyn TaskHandle>>,
}

impl LifecycleCoordinator {
    pub(crate) fn new(
        clipboard: Arc<dyn Clipboard>,
        conn: ConnectionManager,
        state: SharedState,
        period: Duration,
        driver: Arc<dyn TaskDriver>,
    ) -> Self {
        Self {
            phase: AppPhase::Foreground,
            clipboard,
            conn,
            state,
            period,
            driver,
            foreground: None,
            background: None,
        }
    }

    pub fn phase(&self) -> AppPhase {
        self.phase
    }

    /// Start the foreground watcher; called once when the engine starts
    pub(crate) fn start_foreground(&mut self) {
        if self.foreground.as_ref().is_some_and(|h| h.is_live()) {
            return;
        }
        self.foreground = Some(self.spawn_watcher("foreground"));
    }

    /// Apply a phase transition reported by presentation
    pub(crate) async fn set_phase(&mut self, phase: AppPhase) {
        if phase == self.phase {
            return;
        }

        match phase {
            AppPhase::Background => {
                // Background watching only pays off with a sync target
                if self.state.status().await != ConnectionStatus::Connected {
                    tracing::debug!("backgrounded while not connected; watchers unchanged");
                    return;
                }
                if let Some(fg) = self.foreground.take() {
                    fg.stop();
                }
                self.background = Some(self.spawn_watcher("background"));
                self.phase = AppPhase::Background;
            }
            AppPhase::Foreground => {
                if let Some(bg) = self.background.take() {
                    bg.stop();
                }
                self.start_foreground();
                self.phase = AppPhase::Foreground;
            }
        }
        tracing::info!("app phase: {:?}", self.phase);
    }

    /// Stop both watchers; used at engine shutdown
    pub(crate) fn shutdown(&mut self) {
        if let Some(fg) = self.foreground.take() {
            fg.stop();
        }
        if let Some(bg) = self.background.take() {
            bg.stop();
        }
    }

    fn spawn_watcher(&self, label: &'static str) -> Box<dyn TaskHandle> {
        let watcher = ClipboardWatcher::new(
            label,
            self.clipboard.clone(),
            self.conn.clone(),
            self.state.clone(),
            self.period,
        );
        watcher.start(self.driver.as_ref())
    }

    #[cfg(test)]
    pub(crate) fn foreground_live(&self) -> bool {
        self.foreground.as_ref().is_some_and(|h| h.is_live())
    }

    #[cfg(test)]
    pub(crate) fn background_live(&self) -> bool {
        self.background.as_ref().is_some_and(|h| h.is_live())
    }
}
