use super::model::NewTrackEvent;
use super::repository::TrackRepository;
use crate::common::error::ServiceError;
use crate::state::AppState;
use futures_util::StreamExt;
use tracing::{error, info, warn};

pub const TRACK_EVENTS_QUEUE: &str = "track_events";

/// Best-effort dispatch handle given to request handlers.
///
/// `dispatch` enqueues and returns immediately; the worker on the other
/// end owns durability. A full channel drops the event — the client
/// will resend on its next heartbeat tick, and playback is never held
/// hostage to the analytics path.
#[derive(Clone)]
pub struct EventSink {
    tx: async_channel::Sender<NewTrackEvent>,
}

impl EventSink {
    pub fn new(capacity: usize) -> (Self, async_channel::Receiver<NewTrackEvent>) {
        let (tx, rx) = async_channel::bounded(capacity);
        (Self { tx }, rx)
    }

    pub fn dispatch(&self, event: NewTrackEvent) {
        if let Err(e) = self.tx.try_send(event) {
            let fault = ServiceError::Sink(format!("sink queue rejected event: {e}"));
            error!("{fault}");
        }
    }
}

/// Drains the sink channel: every accepted event is appended to
/// Postgres and fanned out to the warehouse queue. Each leg fails
/// independently and only into the logs.
pub async fn run_sink_worker(state: AppState, rx: async_channel::Receiver<NewTrackEvent>) {
    info!("📨 Starting track event sink worker...");

    let mut rx = std::pin::pin!(rx);
    while let Some(event) = rx.next().await {
        if let Err(e) = TrackRepository::insert(&state.db, &event).await {
            let fault = ServiceError::Sink(format!("postgres append failed: {e}"));
            error!("{fault}");
        }

        match serde_json::to_vec(&event) {
            Ok(payload) => {
                if let Err(e) = state.queue.publish(TRACK_EVENTS_QUEUE, &payload).await {
                    warn!("warehouse publish failed, event kept in postgres only: {e}");
                }
            }
            Err(e) => error!("track event serialization failed: {e}"),
        }
    }

    info!("track event sink worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::track::model::EventType;
    use time::OffsetDateTime;

    fn event() -> NewTrackEvent {
        let now = OffsetDateTime::now_utc();
        NewTrackEvent {
            event_type: EventType::PlayHeartbeat,
            client_ts: now,
            server_ts: now,
            session_id: Some("s1".to_string()),
            movie_id: None,
            user_id: None,
            path: None,
            ip: "203.0.113.9".to_string(),
            user_agent: None,
            meta: serde_json::json!({}),
        }
    }

    #[test]
    fn dispatch_never_blocks_or_errors_when_full() {
        let (sink, rx) = EventSink::new(1);
        sink.dispatch(event());
        // Second dispatch overflows the bounded channel; the call still
        // returns and the first event is intact.
        sink.dispatch(event());
        assert_eq!(rx.len(), 1);
    }

    #[test]
    fn dispatched_events_reach_the_receiver() {
        let (sink, rx) = EventSink::new(8);
        sink.dispatch(event());
        let received = rx.try_recv().unwrap();
        assert_eq!(received.event_type, EventType::PlayHeartbeat);
        assert_eq!(received.session_id.as_deref(), Some("s1"));
    }
}
