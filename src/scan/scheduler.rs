//! Auto-scan scheduling
//!
//! A fixed-interval ticker drives repeated capture requests while the session
//! runs. Every tick is gated: nothing fires while a cycle is in flight or
//! inside the cooldown window after a successful match. The ticker task is
//! torn down through a cancellation token owned by the session.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::session::SessionInner;

/// Scheduler timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoScanConfig {
    /// Timer period between capture attempts (milliseconds)
    pub tick_interval_ms: u64,
    /// Quiet period after a successful match (milliseconds)
    pub cooldown_ms: u64,
}

impl Default for AutoScanConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1500,
            cooldown_ms: 3000,
        }
    }
}

/// Scheduler lifecycle state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AutoScanState {
    /// No timer, no enabled intent in effect
    #[default]
    Idle,
    /// Timer armed and ticking
    Scheduled,
    /// Timer stopped but the enabled intent is kept
    Paused,
}

/// Scheduler half of the session state, guarded by the session's lock
#[derive(Debug, Default)]
pub(crate) struct AutoScan {
    pub(crate) state: AutoScanState,
    /// Enabled intent survives pause and session restarts
    pub(crate) enabled: bool,
    pub(crate) ticker: Option<CancellationToken>,
}

impl AutoScan {
    pub(crate) fn cancel_ticker(&mut self) {
        if let Some(token) = self.ticker.take() {
            token.cancel();
        }
    }
}

/// Spawn the ticker task for a running session
pub(crate) fn spawn_ticker(inner: Arc<SessionInner>, token: CancellationToken) {
    let tick = Duration::from_millis(inner.config().auto_scan.tick_interval_ms);

    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + tick, tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!("Auto-scan ticker stopped");
                    break;
                }
                _ = ticker.tick() => {
                    Arc::clone(&inner).tick();
                }
            }
        }
    });
}
