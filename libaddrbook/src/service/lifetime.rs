//! Cancellation tied to the lifetime of the owning UI
//!
//! A `Lifetime` is shared by the store and every operation it runs. Once it
//! is cancelled, in-flight requests are abandoned and their results are never
//! applied, and new operations fail fast.

use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct Lifetime {
    sender: Arc<watch::Sender<bool>>,
}

impl Default for Lifetime {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifetime {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Cancel; idempotent
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Resolves once `cancel` has been called
    pub async fn cancelled(&self) {
        let mut receiver = self.sender.subscribe();
        // The sender lives in `self`, so this only returns on cancel
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }
}

/// Cancels its `Lifetime` when dropped
///
/// Hold one for as long as the UI that issued requests is alive.
#[must_use = "dropping the guard cancels the store immediately"]
#[derive(Debug)]
pub struct ScopeGuard {
    lifetime: Lifetime,
}

impl ScopeGuard {
    pub(crate) fn new(lifetime: Lifetime) -> Self {
        Self { lifetime }
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        self.lifetime.cancel();
    }
}
