//! In-memory `DelayBackend` for controller and console tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::{Notify, Semaphore};

use super::types::{DelayBackend, SyncError};

/// In-memory backend. Re-clamps writes into its own range when one is set,
/// can be switched offline, and can hold writes until released.
pub struct MockBackend {
    stored: Mutex<i64>,
    backend_range: Option<(i64, i64)>,
    offline: AtomicBool,
    gets_failing: AtomicBool,
    gets: AtomicUsize,
    posts: Mutex<Vec<u32>>,
    gate: Option<Semaphore>,
    pub post_started: Notify,
}

impl MockBackend {
    pub fn new(stored: i64) -> Self {
        Self {
            stored: Mutex::new(stored),
            backend_range: None,
            offline: AtomicBool::new(false),
            gets_failing: AtomicBool::new(false),
            gets: AtomicUsize::new(0),
            posts: Mutex::new(Vec::new()),
            gate: None,
            post_started: Notify::new(),
        }
    }

    pub fn with_backend_range(mut self, min: i64, max: i64) -> Self {
        self.backend_range = Some((min, max));
        self
    }

    pub fn gated(mut self) -> Self {
        self.gate = Some(Semaphore::new(0));
        self
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Fail reads only; writes keep working.
    pub fn set_gets_failing(&self, failing: bool) {
        self.gets_failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_stored(&self, value: i64) {
        *self.stored.lock().unwrap() = value;
    }

    pub fn release_post(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn posts(&self) -> Vec<u32> {
        self.posts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DelayBackend for MockBackend {
    async fn get_delay(&self) -> Result<i64, SyncError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) || self.gets_failing.load(Ordering::SeqCst) {
            return Err(SyncError::Request("connection refused".into()));
        }
        Ok(*self.stored.lock().unwrap())
    }

    async fn post_delay(&self, delay: u32) -> Result<i64, SyncError> {
        self.posts.lock().unwrap().push(delay);
        self.post_started.notify_one();
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(SyncError::Status { status: 503, body: String::new() });
        }
        let applied = match self.backend_range {
            Some((min, max)) => i64::from(delay).clamp(min, max),
            None => i64::from(delay),
        };
        *self.stored.lock().unwrap() = applied;
        Ok(applied)
    }
}
