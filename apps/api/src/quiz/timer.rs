//! Per-question response timer.
//!
//! A `ResponseTimer` owns a tick task that publishes the elapsed time every
//! `TICK_INTERVAL` into a watch channel private to that question. Stopping or
//! dropping the timer aborts the task, so a stale ticker can never publish
//! into a later question's display.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug)]
pub struct ResponseTimer {
    started_at: Instant,
    stopped_at: Option<Duration>,
    display: watch::Receiver<u64>,
    ticker: Option<JoinHandle<()>>,
}

impl ResponseTimer {
    /// Starts timing now. Must be called inside a tokio runtime.
    pub fn start() -> Self {
        let started_at = Instant::now();
        let (tx, rx) = watch::channel(0_u64);

        let ticker = tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if tx.send(as_millis(started_at.elapsed())).is_err() {
                    break;
                }
            }
        });

        Self {
            started_at,
            stopped_at: None,
            display: rx,
            ticker: Some(ticker),
        }
    }

    /// Exact elapsed time; frozen once stopped.
    pub fn elapsed(&self) -> Duration {
        self.stopped_at
            .unwrap_or_else(|| self.started_at.elapsed())
    }

    /// Value last published by the ticker (what a client would display).
    pub fn displayed_ms(&self) -> u64 {
        match self.stopped_at {
            Some(final_elapsed) => as_millis(final_elapsed),
            None => *self.display.borrow(),
        }
    }

    #[cfg(test)]
    fn subscribe(&self) -> watch::Receiver<u64> {
        self.display.clone()
    }

    #[cfg(test)]
    fn is_running(&self) -> bool {
        self.stopped_at.is_none()
    }

    /// Stops the ticker and freezes the elapsed time. Idempotent.
    pub fn stop(&mut self) -> Duration {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        let elapsed = self.elapsed();
        *self.stopped_at.get_or_insert(elapsed)
    }
}

impl Drop for ResponseTimer {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

pub fn as_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_ticker_publishes_elapsed_time() {
        let timer = ResponseTimer::start();
        tokio::time::sleep(Duration::from_millis(350)).await;

        assert!(timer.elapsed() >= Duration::from_millis(350));
        let shown = timer.displayed_ms();
        assert!((300..=350).contains(&shown), "displayed {shown}");
        assert!(timer.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_freezes_elapsed_and_display() {
        let mut timer = ResponseTimer::start();
        tokio::time::sleep(Duration::from_millis(1200)).await;
        let stopped = timer.stop();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(timer.elapsed(), stopped);
        assert_eq!(timer.displayed_ms(), as_millis(stopped));
        assert!(!timer.is_running());
        assert_eq!(timer.stop(), stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_releases_ticker() {
        let timer = ResponseTimer::start();
        let mut rx = timer.subscribe();
        rx.borrow_and_update();
        drop(timer);

        let closed = tokio::time::timeout(Duration::from_secs(1), async {
            loop {
                if rx.changed().await.is_err() {
                    break;
                }
            }
        })
        .await;
        assert!(closed.is_ok(), "ticker kept publishing after drop");
    }
}
