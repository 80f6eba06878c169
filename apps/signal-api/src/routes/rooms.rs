//! Read-only room introspection endpoints.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::signaling::registry::RoomSummary;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/rooms", get(list_rooms))
        .route("/rooms/{room_id}", get(get_room))
}

// ---------------------------------------------------------------------------
// GET /api/v1/rooms
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, ToSchema)]
pub struct ListRoomsResponse {
    pub data: Vec<RoomSummary>,
}

#[utoipa::path(
    get,
    path = "/api/v1/rooms",
    tag = "Rooms",
    responses((status = 200, description = "Active rooms", body = ListRoomsResponse))
)]
pub async fn list_rooms(State(state): State<AppState>) -> Json<ListRoomsResponse> {
    Json(ListRoomsResponse {
        data: state.rooms.summaries(),
    })
}

// ---------------------------------------------------------------------------
// GET /api/v1/rooms/{room_id}
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/rooms/{room_id}",
    tag = "Rooms",
    params(("room_id" = String, Path, description = "Room identifier")),
    responses(
        (status = 200, description = "Room and its members", body = RoomSummary),
        (status = 404, description = "No such room", body = crate::error::ApiErrorBody),
    )
)]
pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomSummary>, ApiError> {
    state
        .rooms
        .summary(&room_id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Room not found"))
}
