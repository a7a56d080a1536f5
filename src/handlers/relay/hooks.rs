//! Extension points for inert relay events
//!
//! `dtmf` and `interrupt` frames carry no behavior today, but they are the
//! natural places to attach IVR-style menu branching and in-flight turn
//! cancellation later. Modeling them as a trait keeps the dispatch loop
//! closed to modification when that behavior arrives.

use async_trait::async_trait;
use tracing::info;

/// Hooks invoked for relay events that have no built-in behavior.
///
/// The default implementations log and do nothing else, matching the
/// relay's observed behavior: a keypad press is noted, and an interrupt
/// does NOT cancel the in-flight turn for the interrupted reply.
#[async_trait]
pub trait RelayHooks: Send + Sync {
    /// Called for each `dtmf` frame
    async fn on_dtmf(&self, digit: &str) {
        info!(digit = %digit, "DTMF received (no handler attached)");
    }

    /// Called for each `interrupt` frame
    async fn on_interrupt(&self, utterance_until_interrupt: &str, duration_ms: u64) {
        info!(
            duration_ms,
            interrupted_utterance = %utterance_until_interrupt,
            "Caller interrupted playback (no handler attached)"
        );
    }
}

/// The default hook set: log-only
pub struct NoopHooks;

#[async_trait]
impl RelayHooks for NoopHooks {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingHooks {
        dtmf_count: AtomicU32,
        interrupt_count: AtomicU32,
    }

    #[async_trait]
    impl RelayHooks for CountingHooks {
        async fn on_dtmf(&self, _digit: &str) {
            self.dtmf_count.fetch_add(1, Ordering::SeqCst);
        }

        async fn on_interrupt(&self, _utterance: &str, _duration_ms: u64) {
            self.interrupt_count.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_default_hooks_are_inert() {
        // Just exercises the default bodies; nothing to assert beyond not panicking
        NoopHooks.on_dtmf("3").await;
        NoopHooks.on_interrupt("partial reply", 1500).await;
    }

    #[tokio::test]
    async fn test_custom_hooks_receive_events() {
        let hooks = CountingHooks {
            dtmf_count: AtomicU32::new(0),
            interrupt_count: AtomicU32::new(0),
        };
        hooks.on_dtmf("1").await;
        hooks.on_dtmf("2").await;
        hooks.on_interrupt("hello", 10).await;

        assert_eq!(hooks.dtmf_count.load(Ordering::SeqCst), 2);
        assert_eq!(hooks.interrupt_count.load(Ordering::SeqCst), 1);
    }
}
