//! Debounced camera persistence.
//!
//! DESIGN
//! ======
//! A background task watches the camera's `watch` channel. The first change
//! after a quiet period opens a window; each further change pushes the
//! deadline out by `wait`, but never past `max_wait` from the window's start.
//! When the deadline passes the latest snapshot goes to the sink.
//!
//! FLUSH GUARANTEE
//! ===============
//! The last value of a burst always reaches the sink:
//! - `flush()` (or dropping the `Debouncer`) signals the task, which writes
//!   any pending value immediately and exits;
//! - if every camera handle is dropped, the closed channel does the same.
//!
//! `finish().await` waits for that final write to complete.

#[cfg(test)]
#[path = "debounce_test.rs"]
mod debounce_test;

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::consts::{CAMERA_SAVE_DEBOUNCE_MS, CAMERA_SAVE_MAX_WAIT_MS};

/// Trailing-edge debounce timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceConfig {
    /// Quiet period after the last change before writing.
    pub wait: Duration,
    /// Longest a continuous burst may defer a write.
    pub max_wait: Duration,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            wait: Duration::from_millis(CAMERA_SAVE_DEBOUNCE_MS),
            max_wait: Duration::from_millis(CAMERA_SAVE_MAX_WAIT_MS),
        }
    }
}

/// Handle to a running debounce task.
#[derive(Debug)]
pub struct Debouncer {
    flush_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl Debouncer {
    /// Start debouncing changes on `rx` into `sink`.
    ///
    /// The value current at spawn time counts as already saved. Outside a
    /// tokio runtime the debouncer is inert and every change is dropped with
    /// a warning.
    pub fn spawn<T, F>(mut rx: watch::Receiver<T>, config: DebounceConfig, mut sink: F) -> Self
    where
        T: Clone + Send + Sync + 'static,
        F: FnMut(T) + Send + 'static,
    {
        let Ok(runtime) = Handle::try_current() else {
            warn!("no async runtime; camera updates will not be saved");
            return Self { flush_tx: None, task: None };
        };
        let (flush_tx, mut flush_rx) = oneshot::channel::<()>();
        rx.borrow_and_update();

        let task = runtime.spawn(async move {
            loop {
                // PHASE: IDLE
                tokio::select! {
                    biased;
                    _ = &mut flush_rx => {
                        // A change may have landed before this task was polled.
                        if matches!(rx.has_changed(), Ok(true) | Err(_)) {
                            sink(latest(&mut rx));
                        }
                        return;
                    }
                    changed = rx.changed() => {
                        if changed.is_err() {
                            return;
                        }
                    }
                }

                // PHASE: WINDOW OPEN
                let opened = Instant::now();
                let hard_deadline = opened + config.max_wait;
                let mut deadline = (opened + config.wait).min(hard_deadline);
                loop {
                    tokio::select! {
                        biased;
                        _ = &mut flush_rx => {
                            debug!("flushing pending camera update on shutdown");
                            sink(latest(&mut rx));
                            return;
                        }
                        changed = rx.changed() => {
                            if changed.is_err() {
                                sink(latest(&mut rx));
                                return;
                            }
                            deadline = (Instant::now() + config.wait).min(hard_deadline);
                        }
                        () = tokio::time::sleep_until(deadline) => {
                            sink(latest(&mut rx));
                            break;
                        }
                    }
                }
            }
        });

        Self { flush_tx: Some(flush_tx), task: Some(task) }
    }

    /// Write any pending value now and stop. Idempotent.
    pub fn flush(&mut self) {
        if let Some(tx) = self.flush_tx.take() {
            if tx.send(()).is_err() {
                debug!("debounce task already finished");
            }
        }
    }

    /// Flush, then wait until the final write has happened.
    pub async fn finish(mut self) {
        self.flush();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "camera debounce task failed");
            }
        }
    }

    /// Whether the task is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.flush();
    }
}

/// Clone the newest value and mark it seen, releasing the channel lock before the sink runs.
fn latest<T: Clone>(rx: &mut watch::Receiver<T>) -> T {
    rx.borrow_and_update().clone()
}
