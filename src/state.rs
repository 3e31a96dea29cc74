//! Client-side view state.
//!
//! DESIGN
//! ======
//! A `Snapshot` is what a view renders: the cached delay plus whether the
//! last network call reached the backend. Status is derived, never persisted,
//! and starts `Offline` until the first call succeeds.

use std::fmt;

// =============================================================================
// CONNECTION STATUS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Online,
    Offline,
}

impl ConnectionStatus {
    #[must_use]
    pub fn is_online(self) -> bool {
        matches!(self, Self::Online)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Displayed state: clamped delay in milliseconds and connection status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub delay: u32,
    pub status: ConnectionStatus,
}

impl Snapshot {
    #[must_use]
    pub fn new(delay: u32) -> Self {
        Self { delay, status: ConnectionStatus::Offline }
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
