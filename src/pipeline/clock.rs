//! Suspension points for the sequencer.
//!
//! The sequencer never touches timers directly; every delay goes through a
//! `Clock` so tests can replay the whole script without waiting.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Wall-clock delays on the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Zero-delay clock. Yields to the scheduler and accumulates the virtual time
/// that was requested.
#[derive(Debug, Default)]
pub struct InstantClock {
    elapsed_nanos: AtomicU64,
    sleeps: AtomicU64,
}

impl InstantClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.elapsed_nanos.load(Ordering::SeqCst))
    }

    pub fn sleeps(&self) -> u64 {
        self.sleeps.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Clock for InstantClock {
    async fn sleep(&self, duration: Duration) {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.elapsed_nanos.fetch_add(nanos, Ordering::SeqCst);
        self.sleeps.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_instant_clock_accumulates() {
        let clock = InstantClock::new();
        clock.sleep(Duration::from_millis(200)).await;
        clock.sleep(Duration::from_millis(300)).await;

        assert_eq!(clock.elapsed(), Duration::from_millis(500));
        assert_eq!(clock.sleeps(), 2);
    }
}
