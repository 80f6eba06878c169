pub mod health;
pub mod rooms;

use axum::Router;
use utoipa::OpenApi;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(crate::signaling::server::router())
        .nest("/api/v1", rooms::router())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health,
        // Rooms
        rooms::list_rooms,
        rooms::get_room,
    ),
    components(
        schemas(
            // Error types
            crate::error::ApiErrorBody,
            crate::error::ApiErrorDetail,
            // Route request/response types
            health::HealthResponse,
            rooms::ListRoomsResponse,
            crate::signaling::registry::RoomSummary,
            crate::signaling::registry::MemberSummary,
        )
    ),
    tags(
        (name = "Health", description = "Health check"),
        (name = "Rooms", description = "Signaling room introspection"),
    )
)]
pub struct ApiDoc;
