//! Contains common, primitive types shared across the engine.
//!
//! This module defines the key type used to identify registered modules and
//! the cooperative cancellation handle threaded through every module run and
//! every delay.

use slotmap::new_key_type;
use std::sync::Arc;
use tokio::sync::watch;

new_key_type! {
    /// Identifies a module registered with a scheduler's registry.
    ///
    /// Keys are only meaningful for the registry that issued them.
    pub struct ModuleId;
}

/// A cloneable, cooperative cancellation handle.
///
/// Every clone observes the same state. Cancellation is level-triggered: a
/// token cancelled before anyone waits on it is still seen by later waiters.
/// Nothing is ever aborted forcibly; holders check [`is_cancelled`] at loop
/// boundaries and race [`cancelled`] against their own suspension points.
///
/// [`is_cancelled`]: CancelToken::is_cancelled
/// [`cancelled`]: CancelToken::cancelled
#[derive(Debug, Clone)]
pub struct CancelToken {
    state: Arc<watch::Sender<bool>>,
}

impl CancelToken {
    /// Creates a new, un-cancelled token.
    pub fn new() -> Self {
        let (state, _) = watch::channel(false);
        Self {
            state: Arc::new(state),
        }
    }

    /// Signals cancellation to every clone of this token. Idempotent.
    pub fn cancel(&self) {
        self.state.send_replace(true);
    }

    /// Returns `true` once [`cancel`](CancelToken::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        *self.state.borrow()
    }

    /// Resolves when the token is cancelled, immediately if it already is.
    pub async fn cancelled(&self) {
        let mut rx = self.state.subscribe();
        // The sender lives in `self`, so the channel cannot close under us.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_token_starts_clear() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_cancel_is_shared_between_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_resolves_when_already_set() {
        let token = CancelToken::new();
        token.cancel();
        tokio::time::timeout(Duration::from_millis(50), token.cancelled())
            .await
            .expect("pre-cancelled token must resolve immediately");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_wakes_waiter() {
        let token = CancelToken::new();
        let waiter = token.clone();
        let handle = tokio::spawn(async move { waiter.cancelled().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!handle.is_finished());
        token.cancel();
        handle.await.unwrap();
    }
}
