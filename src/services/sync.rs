//! Sync service — the delay controller.
//!
//! DESIGN
//! ======
//! `DelaySync` owns the cached delay, the connection status, and the poll
//! timer. The cached state lives in a `watch` channel. Values are clamped
//! before they reach `publish`, which only notifies views when the snapshot
//! actually changed. Any view can `subscribe` and render.
//!
//! Writes are optimistic: `send_delay` publishes the clamped value before
//! the request goes out, then reconciles with the backend's echo. A failed
//! write marks the client offline but keeps the optimistic value.
//!
//! ORDERING
//! ========
//! In-flight requests are never cancelled or sequenced. Each response
//! applies as of the moment it completes, so a slow poll can overwrite a
//! newer user edit until the next poll or action. Last completion wins.

use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::backend::{DelayBackend, SyncError};
use crate::delay::DelayRange;
use crate::state::{ConnectionStatus, Snapshot};

// =============================================================================
// CONTROLLER
// =============================================================================

/// Cheap-to-clone handle to one sync session.
#[derive(Clone)]
pub struct DelaySync {
    inner: Arc<SyncInner>,
}

/// Non-owning handle held by the poll task so it never keeps a session alive.
#[derive(Clone)]
pub struct WeakDelaySync {
    inner: Weak<SyncInner>,
}

struct SyncInner {
    backend: Arc<dyn DelayBackend>,
    range: DelayRange,
    snapshot: watch::Sender<Snapshot>,
    poller: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for SyncInner {
    fn drop(&mut self) {
        let slot = self.poller.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = slot.take() {
            handle.abort();
        }
    }
}

impl DelaySync {
    /// Create a session showing `initial` (clamped) and `Offline` until the
    /// first successful call.
    #[must_use]
    pub fn new(backend: Arc<dyn DelayBackend>, range: DelayRange, initial: u32) -> Self {
        let snapshot = Snapshot::new(range.clamp(i64::from(initial)));
        let (tx, _rx) = watch::channel(snapshot);
        Self { inner: Arc::new(SyncInner { backend, range, snapshot: tx, poller: Mutex::new(None) }) }
    }

    #[must_use]
    pub fn range(&self) -> DelayRange {
        self.inner.range
    }

    /// The currently displayed state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        *self.inner.snapshot.borrow()
    }

    /// Receiver notified on every snapshot change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.inner.snapshot.subscribe()
    }

    #[must_use]
    pub fn downgrade(&self) -> WeakDelaySync {
        WeakDelaySync { inner: Arc::downgrade(&self.inner) }
    }

    // -------------------------------------------------------------------------
    // Network operations
    // -------------------------------------------------------------------------

    /// Read the backend's delay, clamp it, and display it.
    ///
    /// On failure the last known value stays displayed and status goes
    /// offline.
    ///
    /// # Errors
    ///
    /// Returns the backend error after marking the session offline.
    pub async fn fetch_current_delay(&self) -> Result<u32, SyncError> {
        match self.inner.backend.get_delay().await {
            Ok(raw) => Ok(self.accept_backend_value(raw)),
            Err(e) => {
                warn!(error = %e, "delay fetch failed");
                self.publish(None, Some(ConnectionStatus::Offline));
                Err(e)
            }
        }
    }

    /// Clamp `value`, display it immediately, then write it to the backend
    /// and display whatever the backend applied.
    ///
    /// # Errors
    ///
    /// Returns the backend error after marking the session offline. The
    /// optimistic value is not rolled back.
    pub async fn send_delay(&self, value: i64) -> Result<u32, SyncError> {
        let delay = self.inner.range.clamp(value);
        if i64::from(delay) != value {
            debug!(requested = value, delay, "delay clamped before send");
        }

        self.publish(Some(delay), None);

        match self.inner.backend.post_delay(delay).await {
            Ok(raw) => Ok(self.accept_backend_value(raw)),
            Err(e) => {
                warn!(error = %e, delay, "delay send failed");
                self.publish(None, Some(ConnectionStatus::Offline));
                Err(e)
            }
        }
    }

    // -------------------------------------------------------------------------
    // Input events
    // -------------------------------------------------------------------------

    /// "+" button: one step slower.
    ///
    /// # Errors
    ///
    /// See [`DelaySync::send_delay`].
    pub async fn increment(&self) -> Result<u32, SyncError> {
        let next = self.inner.range.step_up(self.snapshot().delay);
        self.send_delay(i64::from(next)).await
    }

    /// "-" button: one step faster.
    ///
    /// # Errors
    ///
    /// See [`DelaySync::send_delay`].
    pub async fn decrement(&self) -> Result<u32, SyncError> {
        let next = self.inner.range.step_down(self.snapshot().delay);
        self.send_delay(i64::from(next)).await
    }

    /// Slider input event. Sent as-is on every event.
    ///
    /// # Errors
    ///
    /// See [`DelaySync::send_delay`].
    pub async fn slider_input(&self, value: i64) -> Result<u32, SyncError> {
        self.send_delay(value).await
    }

    // -------------------------------------------------------------------------
    // Poll lifecycle
    // -------------------------------------------------------------------------

    /// Start fetching every `interval`. Replaces (and aborts) any running
    /// poll timer.
    pub fn start_polling(&self, interval: Duration) {
        let handle = super::poll::spawn_poll_task(self.downgrade(), interval);
        let previous = self.poller().replace(handle);
        if let Some(previous) = previous {
            previous.abort();
            debug!("previous poll timer cancelled");
        }
        info!(?interval, "polling started");
    }

    /// Stop the poll timer. Returns `false` if none was running.
    pub fn stop_polling(&self) -> bool {
        let Some(handle) = self.poller().take() else {
            return false;
        };
        handle.abort();
        info!("polling stopped");
        true
    }

    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.poller().as_ref().is_some_and(|h| !h.is_finished())
    }

    // -------------------------------------------------------------------------
    // Internal
    // -------------------------------------------------------------------------

    fn poller(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.inner.poller.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn accept_backend_value(&self, raw: i64) -> u32 {
        let delay = self.inner.range.clamp(raw);
        if i64::from(delay) != raw {
            debug!(raw, delay, "backend delay clamped");
        }
        self.publish(Some(delay), Some(ConnectionStatus::Online));
        delay
    }

    /// Update the snapshot; `None` keeps the current field.
    fn publish(&self, delay: Option<u32>, status: Option<ConnectionStatus>) {
        self.inner.snapshot.send_if_modified(|snap| {
            let next = Snapshot { delay: delay.unwrap_or(snap.delay), status: status.unwrap_or(snap.status) };
            if next == *snap {
                return false;
            }
            if next.delay != snap.delay {
                info!(delay = next.delay, "delay changed");
            }
            if next.status != snap.status {
                info!(status = %next.status, "connection status changed");
            }
            *snap = next;
            true
        });
    }
}

impl WeakDelaySync {
    #[must_use]
    pub fn upgrade(&self) -> Option<DelaySync> {
        self.inner.upgrade().map(|inner| DelaySync { inner })
    }
}

#[cfg(test)]
#[path = "sync_test.rs"]
mod tests;
