//! At most one run at a time

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

/// What happens to a run requested while another is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapPolicy {
    /// Return immediately without running
    Drop,
    /// Wait for the current run, then run
    Queue,
}

/// Serializes async runs; clones share the same gate.
#[derive(Debug, Clone, Default)]
pub struct SingleFlight {
    gate: Arc<Mutex<()>>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` under the gate. `None` means the run was dropped.
    pub async fn run<F, Fut, T>(&self, policy: OverlapPolicy, f: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let _guard = match policy {
            OverlapPolicy::Drop => self.gate.try_lock().ok()?,
            OverlapPolicy::Queue => self.gate.lock().await,
        };
        Some(f().await)
    }

    pub fn is_running(&self) -> bool {
        self.gate.try_lock().is_err()
    }
}
