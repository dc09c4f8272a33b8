//! Minimum spacing between outbound requests to a shared public service.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Serializes callers so consecutive requests start at least `min_interval`
/// apart. The lock is held across the wait, so concurrent callers queue up
/// instead of all sleeping on the same stale timestamp.
#[derive(Debug)]
pub struct Throttle {
    min_interval: Duration,
    last_sent: Mutex<Option<Instant>>,
}

impl Throttle {
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_sent: Mutex::new(None),
        }
    }

    /// Waits until a request may be sent and records the send time.
    pub async fn wait(&self) {
        let mut last_sent = self.last_sent.lock().await;
        if let Some(previous) = *last_sent {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let remaining = self.min_interval - elapsed;
                tracing::debug!(
                    wait_ms = u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX),
                    "throttling outbound request"
                );
                tokio::time::sleep(remaining).await;
            }
        }
        *last_sent = Some(Instant::now());
    }
}
