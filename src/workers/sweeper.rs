use crate::modules::session::model::SessionState;
use crate::modules::session::service::build_report;
use crate::modules::track::repository::TrackRepository;
use crate::state::AppState;
use std::time::Duration;
use time::OffsetDateTime;
use tracing::{error, info, warn};

pub const SESSION_ROLLUPS_QUEUE: &str = "session_rollups";

const SWEEP_BATCH_LIMIT: i64 = 500;

/// Periodic reconciliation sweep.
///
/// Abandonment is a read-time derivation, so nothing is written back to
/// the event table; the sweep's job is to notice quiet sessions and
/// hand their final report to the warehouse for sponsor billing.
pub async fn start_session_sweeper(state: AppState) {
    info!("🧹 Starting session sweeper...");

    let mut ticker =
        tokio::time::interval(Duration::from_secs(state.config.sweep_interval_seconds));

    loop {
        ticker.tick().await;

        if let Err(e) = sweep_once(&state).await {
            error!("session sweep failed: {e:#}");
        }
    }
}

async fn sweep_once(state: &AppState) -> anyhow::Result<()> {
    let now = OffsetDateTime::now_utc();
    let cutoff = now - time::Duration::seconds(state.config.abandonment_timeout_seconds());
    let floor = now - time::Duration::seconds(state.config.sweep_lookback_seconds);

    let stale =
        TrackRepository::stale_sessions(&state.db, cutoff, floor, SWEEP_BATCH_LIMIT).await?;

    if stale.is_empty() {
        return Ok(());
    }

    let mut abandoned = 0usize;
    let mut completed = 0usize;

    for session_id in stale {
        let events = match TrackRepository::find_by_session(&state.db, &session_id).await {
            Ok(events) => events,
            Err(e) => {
                warn!(%session_id, "sweep skipped session: {e}");
                continue;
            }
        };

        let Some(report) = build_report(
            &session_id,
            &events,
            now,
            state.config.heartbeat_interval_seconds,
        ) else {
            continue;
        };

        match report.state {
            SessionState::Abandoned => abandoned += 1,
            SessionState::Completed => completed += 1,
            _ => continue,
        }

        match serde_json::to_vec(&report) {
            Ok(payload) => {
                if let Err(e) = state.queue.publish(SESSION_ROLLUPS_QUEUE, &payload).await {
                    warn!(session_id = %report.session_id, "rollup publish failed: {e}");
                }
            }
            Err(e) => error!("rollup serialization failed: {e}"),
        }
    }

    info!(abandoned, completed, "session sweep finished");
    Ok(())
}
