//! Minimum spacing between calendar writes.

use std::time::Duration;

use tokio::time::{Interval, MissedTickBehavior};

/// Spaces out calendar writes by a fixed minimum interval.
///
/// The first [`wait`](Pacer::wait) returns immediately. A zero interval
/// disables pacing.
pub struct Pacer {
    interval: Option<Interval>,
}

impl Pacer {
    /// Creates a pacer. Must be called from within a tokio runtime.
    pub fn new(period: Duration) -> Self {
        let interval = (!period.is_zero()).then(|| {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });
        Self { interval }
    }

    /// Waits until the next write is allowed.
    pub async fn wait(&mut self) {
        if let Some(interval) = self.interval.as_mut() {
            interval.tick().await;
        }
    }

    /// Returns false when pacing is disabled.
    pub fn is_enabled(&self) -> bool {
        self.interval.is_some()
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::Instant;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn spaces_writes_by_period() {
        let mut pacer = Pacer::new(Duration::from_millis(200));
        let start = Instant::now();

        pacer.wait().await;
        assert_eq!(start.elapsed(), Duration::ZERO);

        pacer.wait().await;
        pacer.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(400));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_work_is_not_followed_by_a_burst() {
        let mut pacer = Pacer::new(Duration::from_millis(200));
        pacer.wait().await;

        tokio::time::sleep(Duration::from_millis(1000)).await;
        pacer.wait().await;
        let after_slow = Instant::now();
        pacer.wait().await;
        assert!(after_slow.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test]
    async fn zero_disables_pacing() {
        let mut pacer = Pacer::new(Duration::ZERO);
        assert!(!pacer.is_enabled());
        let start = std::time::Instant::now();
        for _ in 0..100 {
            pacer.wait().await;
        }
        assert!(start.elapsed() < Duration::from_millis(100));
    }
}
