//! Live countdown refresh
//!
//! Re-runs [`time_remaining`] on a fixed interval with a fresh clock reading
//! and hands each value to a callback. Stopping (or dropping) the ticker
//! cancels the background task.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use super::countdown::{time_remaining, TimeRemaining};

/// Default refresh period
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(1000);

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Handle to a running countdown refresh
#[derive(Debug)]
pub struct CountdownTicker {
    handle: Option<JoinHandle<()>>,
}

impl CountdownTicker {
    /// Start refreshing the countdown to `maturity_date` every `period`.
    ///
    /// The first tick fires immediately. The task ends by itself once the
    /// countdown reports expired, or when `on_tick` returns `Break`.
    /// Must be called from inside a tokio runtime.
    pub fn start<F>(
        maturity_date: NaiveDate,
        period: Duration,
        clock: Arc<dyn Clock>,
        mut on_tick: F,
    ) -> Self
    where
        F: FnMut(&TimeRemaining) -> ControlFlow<()> + Send + 'static,
    {
        log::debug!("Starting countdown ticker to {} every {:?}", maturity_date, period);

        let handle = tokio::spawn(async move {
            let mut ticks = interval(period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticks.tick().await;
                let remaining = time_remaining(maturity_date, clock.now());
                if on_tick(&remaining).is_break() || remaining.is_expired {
                    break;
                }
            }

            log::debug!("Countdown ticker to {} finished", maturity_date);
        });

        Self {
            handle: Some(handle),
        }
    }

    /// Whether the background task has ended
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Cancel the refresh. No callback runs after this returns to the runtime.
    pub fn stop(mut self) {
        self.cancel();
    }

    /// Wait until the ticker ends by itself
    pub async fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    log::warn!("Countdown ticker task failed: {}", e);
                }
            }
        }
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for CountdownTicker {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Mutex;

    /// Clock driven by tokio's (pausable) time
    struct TokioClock {
        base: DateTime<Utc>,
        started: tokio::time::Instant,
    }

    impl TokioClock {
        fn at(base: DateTime<Utc>) -> Arc<Self> {
            Arc::new(Self {
                base,
                started: tokio::time::Instant::now(),
            })
        }
    }

    impl Clock for TokioClock {
        fn now(&self) -> DateTime<Utc> {
            let elapsed = tokio::time::Instant::now() - self.started;
            self.base + chrono::Duration::from_std(elapsed).unwrap()
        }
    }

    fn maturity() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    fn recorder() -> (Arc<Mutex<Vec<TimeRemaining>>>, impl FnMut(&TimeRemaining) -> ControlFlow<()> + Send + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let on_tick = move |r: &TimeRemaining| {
            sink.lock().unwrap().push(*r);
            ControlFlow::Continue(())
        };
        (seen, on_tick)
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_runs_until_expired() {
        let clock = TokioClock::at(Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 57).unwrap());
        let (seen, on_tick) = recorder();

        let ticker = CountdownTicker::start(maturity(), DEFAULT_TICK_INTERVAL, clock, on_tick);
        ticker.join().await;

        let seen = seen.lock().unwrap();
        let seconds: Vec<i64> = seen.iter().map(|r| r.seconds).collect();
        assert_eq!(seconds, vec![3, 2, 1, 0]);
        assert!(seen.last().unwrap().is_expired);
        assert!(seen[..3].iter().all(|r| !r.is_expired));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_further_ticks() {
        let clock = TokioClock::at(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        let (seen, on_tick) = recorder();

        let ticker = CountdownTicker::start(maturity(), DEFAULT_TICK_INTERVAL, clock, on_tick);
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert!(!ticker.is_finished());
        ticker.stop();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(seen.lock().unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let clock = TokioClock::at(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        let (seen, on_tick) = recorder();

        {
            let _ticker = CountdownTicker::start(maturity(), DEFAULT_TICK_INTERVAL, clock, on_tick);
            tokio::time::sleep(Duration::from_millis(1500)).await;
        }

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_callback_can_stop_ticker() {
        let clock = TokioClock::at(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        let mut count = 0;
        let ticker = CountdownTicker::start(maturity(), DEFAULT_TICK_INTERVAL, clock, move |_| {
            count += 1;
            if count == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        ticker.join().await;
    }
}
