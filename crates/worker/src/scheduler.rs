//! Fixed-interval tick driver.
//!
//! Fires the first tick immediately, then one per interval. Each tick runs
//! as its own task so a slow tick never delays the next one. On shutdown
//! the scheduler stops ticking and waits for every in-flight tick.

use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

pub struct TickScheduler {
    interval: Duration,
    cancel: CancellationToken,
    ticks: TaskTracker,
}

impl TickScheduler {
    pub fn new(interval: Duration, cancel: CancellationToken) -> Self {
        Self {
            interval,
            cancel,
            ticks: TaskTracker::new(),
        }
    }

    /// Number of ticks currently running.
    pub fn in_flight(&self) -> usize {
        self.ticks.len()
    }

    /// Spawn `job()` on every tick until cancelled, then wait for all
    /// spawned ticks to finish.
    pub async fn run<F, Fut>(&self, mut job: F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        tracing::info!(interval_secs = self.interval.as_secs(), "Tick scheduler started");

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    tracing::info!(in_flight = self.ticks.len(), "Tick scheduler stopping");
                    break;
                }
                _ = ticker.tick() => {
                    self.ticks.spawn(job());
                }
            }
        }

        self.ticks.close();
        self.ticks.wait().await;
        tracing::info!("All ticks finished");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn first_tick_fires_immediately() {
        let cancel = CancellationToken::new();
        let scheduler = TickScheduler::new(Duration::from_secs(3600), cancel.clone());
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = fired.clone();
        let run = scheduler.run(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        let stop = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            cancel.cancel();
        };
        tokio::join!(run, stop);

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn shutdown_waits_for_in_flight_ticks() {
        let cancel = CancellationToken::new();
        let scheduler = TickScheduler::new(Duration::from_millis(20), cancel.clone());
        let started = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicUsize::new(0));

        let (s, f) = (started.clone(), finished.clone());
        let run = scheduler.run(move || {
            let (s, f) = (s.clone(), f.clone());
            async move {
                s.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(100)).await;
                f.fetch_add(1, Ordering::SeqCst);
            }
        });
        let stop = async {
            tokio::time::sleep(Duration::from_millis(70)).await;
            cancel.cancel();
        };
        tokio::join!(run, stop);

        let started = started.load(Ordering::SeqCst);
        assert!(started >= 2, "ticks should overlap, started {started}");
        assert_eq!(finished.load(Ordering::SeqCst), started);
        assert_eq!(scheduler.in_flight(), 0);
    }

    #[tokio::test]
    async fn cancelled_before_start_runs_nothing() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let scheduler = TickScheduler::new(Duration::from_millis(10), cancel);
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = fired.clone();
        scheduler
            .run(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            })
            .await;

        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
