//! Tokio-based clock implementation.

use async_trait::async_trait;
use std::time::{Duration, Instant};

use crate::traits::Clock;

/// Production clock implementation using Tokio's time functions.
///
/// `now` reads Tokio's clock, so a runtime started with paused time drives
/// debounce windows and timeouts along with `sleep`.
///
/// # Examples
///
/// ```rust
/// use nft_bridge::providers::TokioClock;
///
/// let clock = TokioClock::new();
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TokioClock;

impl TokioClock {
    /// Creates a new Tokio clock instance.
    pub fn new() -> Self {
        Self
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}
