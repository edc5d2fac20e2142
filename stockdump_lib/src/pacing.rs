//! Fixed-interval pacing for Alpha Vantage requests.
//!
//! The free tier allows 5 requests per minute, so consecutive requests are
//! started at least 12 seconds apart. A [`RequestTracker`] counts outcomes for
//! the end-of-run summary.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Minimum spacing between request starts on the free tier.
pub const FREE_TIER_DELAY: Duration = Duration::from_secs(12);

/// Spaces request starts at least `delay` apart.
///
/// Remembers when the last slot was handed out behind a tokio Mutex. The
/// first `acquire()` returns immediately.
pub struct Pacer {
    last_start: Mutex<Option<Instant>>,
    delay: Duration,
    tracker: RequestTracker,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self {
            last_start: Mutex::new(None),
            delay,
            tracker: RequestTracker::new(),
        }
    }

    /// Wait until `delay` has passed since the previous slot, then take a slot.
    pub async fn acquire(&self) {
        let mut last = self.last_start.lock().await;
        if let Some(prev) = *last {
            self.wait_until(prev + self.delay).await;
        }
        *last = Some(Instant::now());
    }

    /// Wait out the interval that follows the most recent slot without taking
    /// a new one. Returns immediately if no slot was ever taken.
    pub async fn drain(&self) {
        let last = self.last_start.lock().await;
        if let Some(prev) = *last {
            self.wait_until(prev + self.delay).await;
        }
    }

    async fn wait_until(&self, deadline: Instant) {
        let now = Instant::now();
        if deadline > now {
            self.tracker.record_wait(deadline - now);
            sleep_until(deadline).await;
        }
    }

    pub fn tracker(&self) -> &RequestTracker {
        &self.tracker
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new(FREE_TIER_DELAY)
    }
}

/// Atomic counters tracking request outcomes.
pub struct RequestTracker {
    requests_made: AtomicU64,
    requests_succeeded: AtomicU64,
    requests_failed: AtomicU64,
    /// Cumulative pacing wait in milliseconds.
    total_wait_ms: AtomicU64,
}

impl RequestTracker {
    fn new() -> Self {
        Self {
            requests_made: AtomicU64::new(0),
            requests_succeeded: AtomicU64::new(0),
            requests_failed: AtomicU64::new(0),
            total_wait_ms: AtomicU64::new(0),
        }
    }

    pub fn record_success(&self) {
        self.requests_made.fetch_add(1, Ordering::Relaxed);
        self.requests_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.requests_made.fetch_add(1, Ordering::Relaxed);
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_wait(&self, duration: Duration) {
        self.total_wait_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    /// Snapshot the current counters.
    pub fn summary(&self) -> TrackerSummary {
        TrackerSummary {
            requests_made: self.requests_made.load(Ordering::Relaxed),
            requests_succeeded: self.requests_succeeded.load(Ordering::Relaxed),
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
            total_wait_secs: self.total_wait_ms.load(Ordering::Relaxed) as f64 / 1000.0,
        }
    }
}

/// Immutable snapshot of tracker counters for display.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TrackerSummary {
    pub requests_made: u64,
    pub requests_succeeded: u64,
    pub requests_failed: u64,
    pub total_wait_secs: f64,
}
