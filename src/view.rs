//! Terminal rendering for snapshots.

use crate::delay::DelayRange;
use crate::state::Snapshot;

/// One status line, e.g. `700 ms [online]`.
#[must_use]
pub fn render_snapshot(snapshot: &Snapshot) -> String {
    format!("{} ms [{}]", snapshot.delay, snapshot.status)
}

/// Describes the bounds, e.g. `100..=2000 ms, step 100 ms`.
#[must_use]
pub fn render_range(range: &DelayRange) -> String {
    format!("{}..={} ms, step {} ms", range.min(), range.max(), range.step())
}

#[cfg(test)]
#[path = "view_test.rs"]
mod tests;
