//! HTTP API response DTOs.

use serde::Serialize;

/// Summary of a room for the rooms list endpoint
#[derive(Debug, Clone, Serialize)]
pub struct RoomSummaryDto {
    pub session_key: String,
    pub participants: Vec<String>,
    pub created_at: String,
}

/// Participant detail for the room detail endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ParticipantDetailDto {
    pub connection_id: String,
    pub role: String,
}

/// Room detail for the room detail endpoint
#[derive(Debug, Clone, Serialize)]
pub struct RoomDetailDto {
    pub session_key: String,
    pub participants: Vec<ParticipantDetailDto>,
    pub message_count: usize,
    pub current_question_index: u32,
    pub created_at: String,
}
