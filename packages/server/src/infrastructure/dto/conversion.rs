//! Conversion logic between DTOs and domain entities.

use std::collections::HashMap;

use crate::domain::{entity, CodeSnapshot, Participant};
use crate::infrastructure::dto::websocket as dto;

// ========================================
// Domain Entity → DTO
// ========================================

impl From<entity::ChatMessage> for dto::ChatMessageDto {
    fn from(model: entity::ChatMessage) -> Self {
        Self {
            id: model.id,
            content: model.content.into_string(),
            sender_role: model.sender_role,
            timestamp: model.timestamp.value(),
        }
    }
}

impl From<entity::CodeStateEntry> for dto::CodeStateEntryDto {
    fn from(model: entity::CodeStateEntry) -> Self {
        Self {
            code: model.code,
            language: model.language,
            last_updated: model.last_updated.value(),
            last_editor: model.last_editor.into_string(),
        }
    }
}

/// 参加者リストを room-users のユーザーマップに変換する
pub fn participants_to_user_map(participants: Vec<Participant>) -> HashMap<String, dto::RoomUserDto> {
    participants
        .into_iter()
        .map(|p| (p.id.into_string(), dto::RoomUserDto { role: p.role }))
        .collect()
}

/// コード状態のスナップショットを code-state イベントに変換する
pub fn snapshot_to_code_state(snapshot: CodeSnapshot) -> dto::ServerEvent {
    dto::ServerEvent::CodeState {
        code_state: snapshot
            .code_state
            .into_iter()
            .map(|(question_id, entry)| (question_id.into_string(), entry.into()))
            .collect(),
        current_question_index: snapshot.current_question_index,
    }
}
