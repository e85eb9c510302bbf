use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Timelike, Utc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::period::Clock;
use crate::record::RecordBatch;
use crate::Result;

/// One scrape cycle, as driven by the [`Scheduler`].
#[async_trait]
pub trait Scrape: Send + Sync {
    async fn scrape(&self) -> Result<RecordBatch>;
}

/// Delay until the next interval boundary, counted from the top of the hour.
///
/// With a one hour interval and `now` at minute 15 this is 45 minutes. Intervals
/// shorter than the time elapsed in the hour wrap to the next multiple, so the
/// result is always in `(0, interval]`.
pub fn next_delay(now: DateTime<Utc>, interval: Duration) -> Duration {
    let interval_ms = interval.as_millis().max(1);
    let elapsed_ms = u128::from(now.minute()) * 60_000
        + u128::from(now.second()) * 1_000
        + u128::from(now.timestamp_subsec_millis());
    let delay_ms = interval_ms - elapsed_ms % interval_ms;
    Duration::from_millis(u64::try_from(delay_ms).unwrap_or(u64::MAX))
}

struct Running {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Runs a scrape right away and then again on every aligned boundary.
///
/// Each cycle sleeps until the next boundary computed after the previous cycle
/// finished, so execution time never accumulates into drift. Only one schedule is
/// live at a time and cycles never overlap.
pub struct Scheduler<S> {
    scraper: Arc<S>,
    clock: Arc<dyn Clock>,
    running: Option<Running>,
}

impl<S: Scrape + 'static> Scheduler<S> {
    pub fn new(scraper: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            scraper,
            clock,
            running: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.as_ref().is_some_and(|r| !r.cancel.is_cancelled())
    }

    /// Starts (or restarts) the schedule. `callback` gets the result of every cycle.
    ///
    /// A previous schedule is cancelled first. Its in-flight cycle, if any, is
    /// awaited before the new schedule runs its first scrape.
    pub fn start<F>(&mut self, mut callback: F, interval: Duration)
    where
        F: FnMut(Result<RecordBatch>) + Send + 'static,
    {
        let previous = self.running.take().map(|running| {
            running.cancel.cancel();
            running.handle
        });

        let cancel = CancellationToken::new();
        let scraper = self.scraper.clone();
        let clock = self.clock.clone();

        let handle = tokio::spawn({
            let cancel = cancel.clone();
            async move {
                if let Some(previous) = previous {
                    if let Err(e) = previous.await {
                        tracing::warn!(error = %e, "previous schedule ended abnormally");
                    }
                }

                loop {
                    if cancel.is_cancelled() {
                        break;
                    }
                    let result = scraper.scrape().await;
                    if let Err(e) = &result {
                        tracing::warn!(error = %e, "scrape cycle failed");
                    }
                    callback(result);

                    if cancel.is_cancelled() {
                        break;
                    }
                    let delay = next_delay(clock.now(), interval);
                    tracing::info!(delay_secs = delay.as_secs(), "next scrape scheduled");
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                tracing::debug!("schedule stopped");
            }
        });

        self.running = Some(Running { cancel, handle });
    }

    /// Cancels the pending timer. A cycle already in flight runs to completion but
    /// is not followed by another one.
    ///
    /// Returns the handle of the stopped schedule so the caller may wait for it.
    pub fn stop(&mut self) -> Option<JoinHandle<()>> {
        self.running.take().map(|running| {
            running.cancel.cancel();
            running.handle
        })
    }
}

impl<S> Drop for Scheduler<S> {
    /// Dropping the scheduler stops the schedule like [`Scheduler::stop`] does.
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            running.cancel.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const HOUR: Duration = Duration::from_secs(60 * 60);

    #[test]
    fn delay_aligns_to_the_hour() {
        let now = Utc.with_ymd_and_hms(2024, 3, 7, 10, 15, 0).unwrap();
        assert_eq!(next_delay(now, HOUR), Duration::from_secs(45 * 60));
    }

    #[test]
    fn delay_on_the_boundary_is_a_full_interval() {
        let now = Utc.with_ymd_and_hms(2024, 3, 7, 10, 0, 0).unwrap();
        assert_eq!(next_delay(now, HOUR), HOUR);
    }

    #[test]
    fn short_interval_wraps_instead_of_going_negative() {
        let now = Utc.with_ymd_and_hms(2024, 3, 7, 10, 45, 0).unwrap();
        let half_hour = Duration::from_secs(30 * 60);
        assert_eq!(next_delay(now, half_hour), Duration::from_secs(15 * 60));

        let now = Utc.with_ymd_and_hms(2024, 3, 7, 10, 59, 59).unwrap();
        assert_eq!(next_delay(now, Duration::from_secs(60)), Duration::from_secs(1));
    }

    #[test]
    fn delay_is_never_zero() {
        let now = Utc.with_ymd_and_hms(2024, 3, 7, 10, 20, 0).unwrap();
        assert_eq!(next_delay(now, Duration::from_secs(5 * 60)), Duration::from_secs(5 * 60));
        assert_eq!(next_delay(now, Duration::ZERO), Duration::from_millis(1));
    }

    #[test]
    fn long_interval_counts_from_the_hour() {
        let now = Utc.with_ymd_and_hms(2024, 3, 7, 10, 15, 0).unwrap();
        let two_hours = 2 * HOUR;
        assert_eq!(next_delay(now, two_hours), Duration::from_secs(105 * 60));
    }
}
