//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::{Room, SessionKey},
    infrastructure::dto::http::{ParticipantDetailDto, RoomDetailDto, RoomSummaryDto},
    ui::state::AppState,
    usecase::RoomQueryError,
};
use mendan_shared::time::timestamp_to_jst_rfc3339;

/// Debug endpoint to get current room state (for testing purposes)
pub async fn debug_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<Room>> {
    let rooms = state.room_query_usecase.rooms().await;
    Json(rooms)
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.room_query_usecase.rooms().await;

    // Domain Model から DTO への変換
    let room_summaries: Vec<RoomSummaryDto> = rooms
        .into_iter()
        .map(|room| RoomSummaryDto {
            session_key: room.session_key.as_str().to_string(),
            participants: room
                .participant_list()
                .iter()
                .map(|p| p.id.as_str().to_string())
                .collect(),
            created_at: timestamp_to_jst_rfc3339(room.created_at.value()),
        })
        .collect();

    Json(room_summaries)
}

/// Get room detail by session key
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(session_key): Path<String>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    let session_key = SessionKey::new(session_key).map_err(|_| StatusCode::NOT_FOUND)?;

    match state.room_query_usecase.room_detail(&session_key).await {
        Ok(room) => {
            // Domain Model から DTO への変換
            let room_detail = RoomDetailDto {
                session_key: room.session_key.as_str().to_string(),
                participants: room
                    .participant_list()
                    .iter()
                    .map(|p| ParticipantDetailDto {
                        connection_id: p.id.as_str().to_string(),
                        role: p.role.as_str().to_string(),
                    })
                    .collect(),
                message_count: room.messages.len(),
                current_question_index: room.current_question_index,
                created_at: timestamp_to_jst_rfc3339(room.created_at.value()),
            };
            Ok(Json(room_detail))
        }
        Err(RoomQueryError::RoomNotFound) => Err(StatusCode::NOT_FOUND),
    }
}
