//! Fixed-interval politeness pacing
//!
//! The registry's backpressure contract is a fixed pause between outbound
//! requests. The limiter is injected into the fetch path so pacing stays
//! out of extraction and persistence logic; one instance paces facet
//! searches and another paces detail fetches.

use std::time::{Duration, Instant};

/// Enforces a minimum interval between successive operations
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last: Option<Instant>,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    /// Waits until the configured interval has passed since the previous
    /// call, then records the current instant
    ///
    /// The first call never waits.
    pub async fn wait(&mut self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                tokio::time::sleep(self.interval - elapsed).await;
            }
        }
        self.last = Some(Instant::now());
    }
}
