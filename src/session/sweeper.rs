//! Periodic removal of expired sessions.
//!
//! The sweeper never touches the session map. Each tick it sends a
//! `DeleteExpired` command through the same queue as every other caller and
//! waits for the acknowledgment, so a sweep cannot interleave with a user
//! operation.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::handle::SessionHandle;

/// Outcome counts of the sweeps a sweeper ran before it stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct SweepStats {
    pub(crate) completed: u64,
    pub(crate) failed: u64,
}

pub(crate) struct Sweeper {
    sessions: SessionHandle,
    interval: Duration,
    stop_rx: oneshot::Receiver<()>,
}

impl Sweeper {
    pub(crate) fn new(
        sessions: SessionHandle,
        interval: Duration,
        stop_rx: oneshot::Receiver<()>,
    ) -> Self {
        Self {
            sessions,
            interval,
            stop_rx,
        }
    }

    pub(crate) async fn run(mut self) -> SweepStats {
        info!(interval_secs = self.interval.as_secs(), "Session sweeper started");

        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut stats = SweepStats::default();
        loop {
            tokio::select! {
                biased;

                _ = &mut self.stop_rx => break,

                _ = ticker.tick() => {
                    if self.sweep().await {
                        stats.completed += 1;
                    } else {
                        stats.failed += 1;
                    }
                }
            }
        }

        info!(
            completed = stats.completed,
            failed = stats.failed,
            "Session sweeper stopped"
        );
        stats
    }

    async fn sweep(&self) -> bool {
        debug!("Running expired session sweep");
        match self.sessions.delete_expired().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Expired session sweep failed");
                false
            }
        }
    }
}
