use serde::Serialize;
use utoipa::ToSchema;

/// Derived lifecycle of one playback session.
///
/// Never persisted: always recomputed from the server-ordered event
/// stream, so late arrivals and sweeps agree on the same answer.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// `play_start` seen, no heartbeat yet.
    Started,
    /// Heartbeats arriving within the abandonment window.
    Active,
    /// `play_end` seen. Terminal.
    Completed,
    /// No activity within twice the heartbeat interval and no end.
    Abandoned,
}
