use super::dto::SessionReport;
use super::model::SessionState;
use crate::common::error::ServiceError;
use crate::modules::track::model::{EventType, StoredTrackEvent};
use crate::modules::track::repository::TrackRepository;
use crate::state::AppState;
use time::{Duration, OffsetDateTime};
use tracing::warn;

pub struct SessionService;

impl SessionService {
    /// Reconcile one session on demand from its stored events.
    pub async fn reconcile(
        state: AppState,
        session_id: &str,
    ) -> Result<SessionReport, ServiceError> {
        let events = TrackRepository::find_by_session(&state.db, session_id).await?;

        build_report(
            session_id,
            &events,
            OffsetDateTime::now_utc(),
            state.config.heartbeat_interval_seconds,
        )
        .ok_or(ServiceError::NotFound("session"))
    }
}

/// Fold the event stream into a session state.
///
/// Ordering uses `server_ts` only — client clocks are never trusted for
/// transitions, and arrival order is irrelevant because the fold sorts
/// first. Returns `None` when the stream holds no playback lifecycle
/// events at all.
pub fn derive_state(
    events: &[StoredTrackEvent],
    now: OffsetDateTime,
    heartbeat_interval_seconds: i64,
) -> Option<SessionState> {
    let mut ordered: Vec<&StoredTrackEvent> = events.iter().collect();
    ordered.sort_by_key(|e| (e.server_ts, e.id));

    let timeout = Duration::seconds(2 * heartbeat_interval_seconds);

    let mut started = false;
    let mut completed = false;
    let mut saw_heartbeat = false;
    let mut last_activity: Option<OffsetDateTime> = None;

    for event in ordered {
        let Some(ty) = EventType::parse(&event.event_type) else {
            continue;
        };

        match ty {
            EventType::PlayStart => {
                if started {
                    warn!(
                        session_id = event.session_id.as_deref().unwrap_or("-"),
                        "protocol violation: duplicate play_start"
                    );
                } else {
                    started = true;
                }
                if !completed {
                    last_activity = bump(last_activity, event.server_ts);
                }
            }
            EventType::PlayHeartbeat => {
                if !started {
                    warn!(
                        session_id = event.session_id.as_deref().unwrap_or("-"),
                        "protocol violation: play_heartbeat without play_start"
                    );
                }
                // Completion is terminal; late heartbeats are stored
                // but do not reopen the session.
                if !completed {
                    saw_heartbeat = true;
                    last_activity = bump(last_activity, event.server_ts);
                }
            }
            EventType::PlayEnd => {
                if !started {
                    warn!(
                        session_id = event.session_id.as_deref().unwrap_or("-"),
                        "protocol violation: play_end without play_start"
                    );
                }
                completed = true;
                last_activity = bump(last_activity, event.server_ts);
            }
            _ => {}
        }
    }

    if completed {
        return Some(SessionState::Completed);
    }

    let last_activity = last_activity?;

    if now - last_activity > timeout {
        Some(SessionState::Abandoned)
    } else if saw_heartbeat {
        Some(SessionState::Active)
    } else {
        Some(SessionState::Started)
    }
}

pub fn build_report(
    session_id: &str,
    events: &[StoredTrackEvent],
    now: OffsetDateTime,
    heartbeat_interval_seconds: i64,
) -> Option<SessionReport> {
    let state = derive_state(events, now, heartbeat_interval_seconds)?;

    let started_at = events
        .iter()
        .filter(|e| e.event_type == EventType::PlayStart.as_str())
        .map(|e| e.server_ts)
        .min();

    let last_event_at = events.iter().map(|e| e.server_ts).max()?;

    let movie_id = events.iter().find_map(|e| e.movie_id);

    let heartbeat_count = events
        .iter()
        .filter(|e| e.event_type == EventType::PlayHeartbeat.as_str())
        .count();

    Some(SessionReport {
        session_id: session_id.to_string(),
        state,
        movie_id,
        started_at,
        last_event_at,
        event_count: events.len(),
        heartbeat_count,
    })
}

fn bump(current: Option<OffsetDateTime>, candidate: OffsetDateTime) -> Option<OffsetDateTime> {
    match current {
        Some(ts) if ts >= candidate => Some(ts),
        _ => Some(candidate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use uuid::Uuid;

    const INTERVAL: i64 = 30;

    fn t0() -> OffsetDateTime {
        datetime!(2026-01-01 12:00:00 UTC)
    }

    fn event(ty: EventType, server_ts: OffsetDateTime) -> StoredTrackEvent {
        StoredTrackEvent {
            id: Uuid::new_v4(),
            event_type: ty.as_str().to_string(),
            client_ts: server_ts,
            server_ts,
            session_id: Some("s1".to_string()),
            movie_id: Some(Uuid::nil()),
            user_id: None,
            path: None,
            ip: "203.0.113.9".to_string(),
            user_agent: None,
            meta: serde_json::json!({}),
        }
    }

    fn secs(n: i64) -> Duration {
        Duration::seconds(n)
    }

    #[test]
    fn full_lifecycle_reconciles_to_completed() {
        let events = vec![
            event(EventType::PlayStart, t0()),
            event(EventType::PlayHeartbeat, t0() + secs(30)),
            event(EventType::PlayHeartbeat, t0() + secs(60)),
            event(EventType::PlayHeartbeat, t0() + secs(90)),
            event(EventType::PlayEnd, t0() + secs(95)),
        ];

        let state = derive_state(&events, t0() + secs(1000), INTERVAL);
        assert_eq!(state, Some(SessionState::Completed));
    }

    #[test]
    fn silence_past_the_window_means_abandoned() {
        let events = vec![
            event(EventType::PlayStart, t0()),
            event(EventType::PlayHeartbeat, t0() + secs(30)),
            event(EventType::PlayHeartbeat, t0() + secs(61)),
        ];

        // 61s of silence is past the 2 × 30s window.
        let state = derive_state(&events, t0() + secs(61 + 61), INTERVAL);
        assert_eq!(state, Some(SessionState::Abandoned));
    }

    #[test]
    fn recent_heartbeat_keeps_the_session_active() {
        let events = vec![
            event(EventType::PlayStart, t0()),
            event(EventType::PlayHeartbeat, t0() + secs(30)),
            event(EventType::PlayHeartbeat, t0() + secs(61)),
        ];

        let state = derive_state(&events, t0() + secs(90), INTERVAL);
        assert_eq!(state, Some(SessionState::Active));
    }

    #[test]
    fn start_without_heartbeats_is_started_until_the_window_closes() {
        let events = vec![event(EventType::PlayStart, t0())];

        assert_eq!(
            derive_state(&events, t0() + secs(30), INTERVAL),
            Some(SessionState::Started)
        );
        assert_eq!(
            derive_state(&events, t0() + secs(61), INTERVAL),
            Some(SessionState::Abandoned)
        );
    }

    #[test]
    fn arrival_order_does_not_matter() {
        // Reversed network arrival: the heartbeat row precedes the
        // start row in the input, server_ts still increasing.
        let in_order = vec![
            event(EventType::PlayStart, t0()),
            event(EventType::PlayHeartbeat, t0() + secs(30)),
        ];
        let reversed = vec![in_order[1].clone(), in_order[0].clone()];

        let now = t0() + secs(45);
        assert_eq!(
            derive_state(&in_order, now, INTERVAL),
            derive_state(&reversed, now, INTERVAL)
        );
    }

    #[test]
    fn duplicate_heartbeats_do_not_change_the_outcome() {
        let hb = event(EventType::PlayHeartbeat, t0() + secs(30));
        let single = vec![event(EventType::PlayStart, t0()), hb.clone()];
        let doubled = vec![event(EventType::PlayStart, t0()), hb.clone(), hb];

        let now = t0() + secs(45);
        assert_eq!(
            derive_state(&single, now, INTERVAL),
            derive_state(&doubled, now, INTERVAL)
        );
    }

    #[test]
    fn completion_is_terminal() {
        let events = vec![
            event(EventType::PlayStart, t0()),
            event(EventType::PlayEnd, t0() + secs(10)),
            event(EventType::PlayHeartbeat, t0() + secs(20)),
        ];

        // A heartbeat after the end is stored but the session stays
        // completed, even once the silence window has long passed.
        let state = derive_state(&events, t0() + secs(5000), INTERVAL);
        assert_eq!(state, Some(SessionState::Completed));
    }

    #[test]
    fn duplicate_start_is_tolerated() {
        let events = vec![
            event(EventType::PlayStart, t0()),
            event(EventType::PlayStart, t0() + secs(1)),
            event(EventType::PlayHeartbeat, t0() + secs(30)),
        ];

        let state = derive_state(&events, t0() + secs(40), INTERVAL);
        assert_eq!(state, Some(SessionState::Active));
    }

    #[test]
    fn heartbeat_without_start_still_derives_a_state() {
        let events = vec![event(EventType::PlayHeartbeat, t0())];

        assert_eq!(
            derive_state(&events, t0() + secs(10), INTERVAL),
            Some(SessionState::Active)
        );
        assert_eq!(
            derive_state(&events, t0() + secs(120), INTERVAL),
            Some(SessionState::Abandoned)
        );
    }

    #[test]
    fn non_playback_events_alone_yield_no_session() {
        let events = vec![
            event(EventType::PageView, t0()),
            event(EventType::Search, t0() + secs(5)),
        ];

        assert_eq!(derive_state(&events, t0() + secs(10), INTERVAL), None);
    }

    #[test]
    fn report_aggregates_counts_and_timestamps() {
        let events = vec![
            event(EventType::PlayStart, t0()),
            event(EventType::PlayHeartbeat, t0() + secs(30)),
            event(EventType::PlayHeartbeat, t0() + secs(60)),
            event(EventType::PlayEnd, t0() + secs(70)),
        ];

        let report = build_report("s1", &events, t0() + secs(100), INTERVAL).unwrap();
        assert_eq!(report.state, SessionState::Completed);
        assert_eq!(report.started_at, Some(t0()));
        assert_eq!(report.last_event_at, t0() + secs(70));
        assert_eq!(report.event_count, 4);
        assert_eq!(report.heartbeat_count, 2);
        assert_eq!(report.movie_id, Some(Uuid::nil()));
    }

    #[test]
    fn empty_stream_yields_no_report() {
        assert!(build_report("s1", &[], t0(), INTERVAL).is_none());
    }
}
