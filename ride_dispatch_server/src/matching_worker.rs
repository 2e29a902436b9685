use std::time::Duration;

use log::*;
use ride_dispatch_engine::{helpers::DispatchPolicy, MatchingApi, NotificationHub, SqliteDatabase};
use tokio::task::JoinHandle;

/// Starts the matching worker. Do not await the returned JoinHandle, as it will run indefinitely.
///
/// A failed pass is logged and left for the next tick; its transaction has already been rolled back.
pub fn start_matching_worker(
    db: SqliteDatabase,
    hub: NotificationHub,
    policy: DispatchPolicy,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let api = MatchingApi::new(db, hub, policy);
        info!("🕰️ Matching worker started. Passes run every {}ms", interval.as_millis());
        loop {
            timer.tick().await;
            trace!("🕰️ Running matching pass");
            match api.run_matching_pass().await {
                Ok(outcomes) if outcomes.is_empty() => {},
                Ok(outcomes) => {
                    info!("🕰️ {} rides matched", outcomes.len());
                    debug!(
                        "🕰️ Matched: {}",
                        outcomes.iter().map(|o| format!("{} -> {}", o.ride_id, o.chair_id)).collect::<Vec<_>>().join(", ")
                    );
                },
                Err(e) => {
                    error!("🕰️ Error running matching pass: {e}");
                },
            }
        }
    })
}
