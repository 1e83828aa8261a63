//! Fixed-interval scheduling of price checks.

use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use crate::api::product_page::PageFetcher;
use crate::services::check_service::PriceTracker;
use crate::services::notify_service::Notifier;

/// Next-due bookkeeping for a fixed cadence
#[derive(Debug, Clone)]
pub struct Schedule {
    interval: Duration,
    next_due: Instant,
}

impl Schedule {
    pub fn new(interval: Duration, first_due: Instant) -> Self {
        Self { interval, next_due: first_due }
    }

    pub fn next_due(&self) -> Instant {
        self.next_due
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next_due
    }

    /// Move to the next slot after a run
    ///
    /// Slots are counted from the previous due time, not from when the run
    /// finished. Slots already in the past are skipped.
    pub fn advance(&mut self, now: Instant) {
        self.next_due += self.interval;
        while self.next_due <= now {
            self.next_due += self.interval;
        }
    }
}

/// Drives the tracker until the shutdown future resolves
pub struct Scheduler {
    schedule: Schedule,
    poll_interval: Duration,
}

impl Scheduler {
    pub fn new(schedule: Schedule, poll_interval: Duration) -> Self {
        Self { schedule, poll_interval }
    }

    pub async fn run<F, N, S>(&mut self, tracker: &mut PriceTracker<'_, F, N>, shutdown: S)
    where
        F: PageFetcher,
        N: Notifier,
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            if self.schedule.is_due(Instant::now()) {
                let outcome = tracker.run_cycle().await;
                debug!("Cycle finished: {}", outcome);
                self.schedule.advance(Instant::now());
            }

            debug!(
                "⏳ Waiting for the next scheduled price check (due in {}s)...",
                self.schedule.next_due().saturating_duration_since(Instant::now()).as_secs()
            );

            tokio::select! {
                _ = &mut shutdown => {
                    tracker.stop();
                    info!("👋 Price tracker stopped by user. Exiting gracefully...");
                    break;
                }
                _ = sleep(self.poll_interval) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::models::TrackerState;
    use crate::services::check_service::tests::{temp_history, FakeFetcher, RecordingNotifier};
    use std::sync::atomic::Ordering;

    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn test_advance_counts_from_due_time() {
        let start = Instant::now();
        let mut schedule = Schedule::new(24 * HOUR, start);
        assert!(schedule.is_due(start));

        // Check took five minutes; next slot is still start + 24h
        schedule.advance(start + Duration::from_secs(300));
        assert_eq!(schedule.next_due(), start + 24 * HOUR);
        assert!(!schedule.is_due(start + 23 * HOUR));
        assert!(schedule.is_due(start + 24 * HOUR));
    }

    #[test]
    fn test_advance_skips_missed_slots() {
        let start = Instant::now();
        let mut schedule = Schedule::new(24 * HOUR, start);

        schedule.advance(start + 50 * HOUR);
        assert_eq!(schedule.next_due(), start + 72 * HOUR);
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_immediately_then_every_interval() {
        let config = test_config();
        let fetcher = FakeFetcher::failing();
        let calls = fetcher.calls.clone();
        let mut tracker = PriceTracker::new(&config, fetcher, RecordingNotifier::default(), temp_history());

        let mut scheduler = Scheduler::new(
            Schedule::new(24 * HOUR, Instant::now()),
            Duration::from_secs(60),
        );
        scheduler.run(&mut tracker, sleep(49 * HOUR)).await;

        // 0h, 24h and 48h
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.state(), TrackerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_before_first_due() {
        let config = test_config();
        let fetcher = FakeFetcher::failing();
        let calls = fetcher.calls.clone();
        let mut tracker = PriceTracker::new(&config, fetcher, RecordingNotifier::default(), temp_history());

        let mut scheduler = Scheduler::new(
            Schedule::new(24 * HOUR, Instant::now() + 24 * HOUR),
            Duration::from_secs(60),
        );
        scheduler.run(&mut tracker, sleep(HOUR)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(tracker.state(), TrackerState::Stopped);
    }
}
