use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::play::handler::issue_grant,
        crate::modules::track::handler::ingest_event,
        crate::modules::session::handler::get_session,
    ),
    components(
        schemas(
            crate::modules::play::model::PlayGrant,
            crate::modules::play::model::PlaySource,
            crate::modules::play::model::SubtitleTrack,
            crate::modules::play::model::OverlaySlot,
            crate::modules::play::model::DrmInfo,
            crate::modules::play::model::SourceKind,
            crate::modules::play::model::OverlayKind,
            crate::modules::play::model::OverlayPlacement,
            crate::modules::track::dto::TrackEventRequest,
            crate::modules::track::model::EventType,
            crate::modules::session::dto::SessionReport,
            crate::modules::session::model::SessionState,
        )
    ),
    tags(
        (name = "Playback", description = "Play grant issuance"),
        (name = "Tracking", description = "Lifecycle event ingestion"),
        (name = "Sessions", description = "Session reconciliation reports")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
