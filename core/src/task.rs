//! Periodic-task capability supplied by the host platform
//!
//! Watchers run as cooperatively scheduled tasks handed to a `TaskDriver`;
//! on the host runtime that is tokio, a mobile shell supplies its own.
//! Stopping a handle flips a live flag the task consults at the top of
//! every tick, so a stop takes effect before the next tick without
//! interrupting one in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::future::BoxFuture;

/// Handle to a started periodic task
pub trait TaskHandle: Send {
    fn is_live(&self) -> bool;

    fn stop(&self);
}

/// Spawns periodic work onto the host scheduler
///
/// `work` is the whole watcher loop; `live` is the flag the loop consults
/// and `stop` clears.
pub trait TaskDriver: Send + Sync {
    fn start(&self, work: BoxFuture<'static, ()>, live: Arc<AtomicBool>) -> Box<dyn TaskHandle>;
}

/// Default driver: plain tokio tasks
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDriver;

impl TaskDriver for TokioDriver {
    fn start(&self, work: BoxFuture<'static, ()>, live: Arc<AtomicBool>) -> Box<dyn TaskHandle> {
        let task = tokio::spawn(work);
        Box::new(TokioTaskHandle { live, task })
    }
}

struct TokioTaskHandle {
    live: Arc<AtomicBool>,
    task: tokio::task::JoinHandle<()>,
}

impl TaskHandle for TokioTaskHandle {
    fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire) && !self.task.is_finished()
    }

    fn stop(&self) {
        self.live.store(false, Ordering::Release);
    }
}

impl Drop for TokioTaskHandle {
    fn drop(&mut self) {
        self.live.store(false, Ordering::Release);
    }
}
