//! Backend — the remote store for the delay value.
//!
//! DESIGN
//! ======
//! The backend exposes a single resource, `/api/delay`, read with `GET` and
//! written with `POST`. The backend may re-clamp a written value, so writes
//! return what it actually stored. `DelayBackend` is the seam between the
//! controller and the network.

pub mod http;
pub mod types;

#[cfg(test)]
pub mod test_helpers;

pub use http::{HttpDelayBackend, HttpTimeouts};
pub use types::{DelayBackend, SyncError};
