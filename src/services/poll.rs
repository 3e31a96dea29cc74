//! Poll service — periodic re-fetch of the delay.
//!
//! DESIGN
//! ======
//! A background task wakes every `interval` and calls
//! `fetch_current_delay`. The first fetch happens one interval after start;
//! callers that want an immediate value fetch once themselves. A slow
//! request delays the next tick instead of bursting to catch up.
//!
//! The task holds a weak handle and exits once the session is dropped.
//! Failures are already logged and reflected as offline by the controller,
//! so the loop just keeps ticking.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::trace;

use super::sync::WeakDelaySync;

/// Spawn the poll task. Returns a handle for cancellation.
pub fn spawn_poll_task(target: WeakDelaySync, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let Some(sync) = target.upgrade() else {
                trace!("sync session dropped; poll task exiting");
                return;
            };
            let _ = sync.fetch_current_delay().await;
        }
    })
}
