use std::time::Duration;

use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{error, info};

use super::run_dispatch_cycle;
use crate::{state::AppState, timestamp};

/// Runs one cycle per interval until the returned handle is aborted.
/// A slow cycle delays the next tick instead of queueing extra ones.
pub fn spawn(state: AppState) -> JoinHandle<()> {
    let period = Duration::from_secs(state.config.dispatch.interval_secs);
    tokio::spawn(async move {
        info!(interval_secs = period.as_secs(), "dispatch trigger started");
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            tick(&state).await;
        }
    })
}

/// One cycle at the configured wall clock. Failures are logged; the next tick retries.
pub async fn tick(state: &AppState) {
    let now = match timestamp::wall_clock_now(state.config.dispatch.utc_offset_minutes) {
        Ok(now) => now,
        Err(e) => {
            error!(error = %e, "invalid REMINDER_UTC_OFFSET_MINUTES; skipping cycle");
            return;
        }
    };
    if let Err(e) = run_dispatch_cycle(state, now).await {
        error!(error = %e, "dispatch cycle aborted");
    }
}
