//! Start-of-simulation gate
//!
//! Lets a remote client hold the simulation at its start until test
//! parameters are configured. The release is latched, so a `StartSim` that
//! arrives before the simulation starts waiting is not lost.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Notify;

/// Latched one-shot signal from a remote client to the simulation
#[derive(Debug, Default)]
pub struct BeginGate {
    released: AtomicBool,
    notify: Notify,
}

impl BeginGate {
    /// Create a closed gate
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the gate; returns `true` for the first release only
    pub fn release(&self) -> bool {
        let first = !self.released.swap(true, Ordering::SeqCst);
        // Stores a permit when nobody is waiting yet
        self.notify.notify_one();
        first
    }

    /// Whether the gate has been opened
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    /// Wait until the gate opens or `timeout` elapses
    ///
    /// Returns `true` when released, `false` on timeout.
    pub async fn wait(&self, timeout: Duration) -> bool {
        if self.is_released() {
            return true;
        }
        tokio::time::timeout(timeout, self.notify.notified())
            .await
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_release_before_wait() {
        let gate = BeginGate::new();

        assert!(gate.release());
        assert!(!gate.release());
        assert!(gate.wait(Duration::from_millis(10)).await);
    }

    #[tokio::test]
    async fn test_release_while_waiting() {
        let gate = Arc::new(BeginGate::new());

        let waiter = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move { gate.wait(Duration::from_secs(5)).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        gate.release();

        assert!(waiter.await.unwrap());
    }

    #[tokio::test]
    async fn test_timeout_without_release() {
        let gate = BeginGate::new();

        assert!(!gate.wait(Duration::from_millis(20)).await);
        assert!(!gate.is_released());
    }
}
