//! Background removal of expired notes.
//!
//! The reaper is the only proactive cleanup. Request paths still detect
//! expiry lazily, and both go through the store lock, so a note is removed
//! by exactly one of them.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::storage::NoteStore;

/// Default sweep period (5 minutes).
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Shortest accepted sweep period.
const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

/// Periodically sweeps a [`NoteStore`].
#[derive(Debug)]
pub struct ExpiryReaper {
    store: Arc<NoteStore>,
    period: Duration,
}

impl ExpiryReaper {
    pub fn new(store: Arc<NoteStore>, period: Duration) -> Self {
        Self {
            store,
            period: period.max(MIN_SWEEP_INTERVAL),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Start sweeping on the current tokio runtime.
    ///
    /// The first sweep happens one full period after start.
    pub fn spawn(self) -> ReaperHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        info!(period_secs = self.period.as_secs_f64(), "Starting expiry reaper");
        let task = tokio::spawn(run(self.store, self.period, shutdown_rx));
        ReaperHandle { shutdown_tx, task }
    }
}

/// Owner's handle on a running reaper.
///
/// Dropping the handle also stops the reaper, at its next wake-up.
#[derive(Debug)]
pub struct ReaperHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ReaperHandle {
    /// Stop the reaper and wait for its task to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(err) = self.task.await {
            warn!(error = %err, "Expiry reaper task ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

async fn run(store: Arc<NoteStore>, period: Duration, mut shutdown_rx: watch::Receiver<bool>) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    interval.tick().await;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let removed = store.sweep();
                if removed > 0 {
                    debug!(removed = removed, "Swept expired notes");
                }
            }
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
        }
    }

    info!("Expiry reaper stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::gate::Argon2Gate;
    use crate::storage::NewNote;
    use chrono::Duration as ChronoDuration;

    fn store_with_clock() -> (Arc<NoteStore>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let store = NoteStore::new(Arc::new(Argon2Gate::default())).with_clock(clock.clone());
        (Arc::new(store), clock)
    }

    #[tokio::test]
    async fn test_reaper_sweeps_expired_notes() {
        let (store, clock) = store_with_clock();
        store.put(NewNote::new("old")).unwrap();
        store.put(NewNote::new("young").with_ttl_hours(10)).unwrap();
        clock.advance(ChronoDuration::hours(2));

        let handle = ExpiryReaper::new(store.clone(), Duration::from_millis(20)).spawn();
        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.shutdown().await;

        let stats = store.stats();
        assert_eq!(store.len(), 1);
        assert_eq!(stats.expired_notes, 1);
        assert!(stats.is_balanced());
    }

    #[tokio::test]
    async fn test_shutdown_stops_task() {
        let (store, _clock) = store_with_clock();
        let handle = ExpiryReaper::new(store, DEFAULT_SWEEP_INTERVAL).spawn();
        assert!(!handle.is_finished());

        tokio::time::timeout(Duration::from_secs(1), handle.shutdown())
            .await
            .expect("reaper should stop promptly");
    }

    #[tokio::test]
    async fn test_zero_period_is_raised() {
        let (store, _clock) = store_with_clock();
        let reaper = ExpiryReaper::new(store, Duration::ZERO);
        assert_eq!(reaper.period(), MIN_SWEEP_INTERVAL);
    }
}
