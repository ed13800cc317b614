//! Message formatting utilities for client display.

use std::collections::HashMap;

use mendan_server::infrastructure::dto::websocket::{ChatMessageDto, RoomUserDto};
use mendan_shared::time::timestamp_to_jst_rfc3339;

use crate::peer_link::LinkKind;

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format the welcome message carrying the assigned connection id
    pub fn format_welcome(connection_id: &str) -> String {
        format!("\nConnected. Your connection id is {}\n", connection_id)
    }

    /// Format the room-users message showing the other participants
    pub fn format_room_users(users: &HashMap<String, RoomUserDto>) -> String {
        let mut output = String::new();
        output.push_str("\n\n============================================================\n");
        output.push_str("Participants already in the room:\n");

        if users.is_empty() {
            output.push_str("(You are alone)\n");
        } else {
            let mut entries: Vec<(&String, &RoomUserDto)> = users.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            for (connection_id, user) in entries {
                output.push_str(&format!("{} - {}\n", connection_id, user.role));
            }
        }

        output.push_str("============================================================\n");
        output
    }

    /// Format a user-joined notification
    pub fn format_user_joined(connection_id: &str, role: &str) -> String {
        format!("\n+ {} joined as {}\n", connection_id, role)
    }

    /// Format a user-left notification
    pub fn format_user_left(connection_id: &str, closed_links: usize) -> String {
        if closed_links > 0 {
            format!(
                "\n- {} left ({} peer link(s) closed)\n",
                connection_id, closed_links
            )
        } else {
            format!("\n- {} left\n", connection_id)
        }
    }

    /// Format the chat history replay received at join time
    pub fn format_chat_history(messages: &[ChatMessageDto]) -> String {
        let mut output = String::new();
        if messages.is_empty() {
            return output;
        }
        output.push_str("\n--- chat history ---\n");
        for message in messages {
            output.push_str(&format!(
                "[{}] @{}: {}\n",
                timestamp_to_jst_rfc3339(message.timestamp),
                message.sender_role,
                message.content
            ));
        }
        output.push_str("--- end of history ---\n");
        output
    }

    /// Format a chat message
    pub fn format_chat_message(sender_role: &str, content: &str, sent_at: i64) -> String {
        let timestamp_str = timestamp_to_jst_rfc3339(sent_at);
        format!(
            "\n\n------------------------------------------------------------\n\
             @{}: {}\n\
             sent at {}\n\
             ------------------------------------------------------------\n",
            sender_role, content, timestamp_str
        )
    }

    /// Format the code-state snapshot received at join time
    pub fn format_code_state(entry_count: usize, current_question_index: u32) -> String {
        format!(
            "\n[code] {} question(s) with saved code, current question index {}\n",
            entry_count, current_question_index
        )
    }

    /// Format a code-update notification
    pub fn format_code_update(question_id: &str, language: &str, timestamp: i64) -> String {
        format!(
            "\n[code] question {} updated ({}) at {}\n",
            question_id,
            language,
            timestamp_to_jst_rfc3339(timestamp)
        )
    }

    /// Format a question-change notification
    pub fn format_question_change(question_id: &str, current_question_index: u32) -> String {
        format!(
            "\n[question] moved to {} (index {})\n",
            question_id, current_question_index
        )
    }

    /// Format a language-change notification
    pub fn format_language_change(question_id: &str, language: &str) -> String {
        format!("\n[language] question {} now uses {}\n", question_id, language)
    }

    /// Format a relayed signal notification
    pub fn format_signal(from: &str, kind: &str, link: LinkKind) -> String {
        format!("\n[signal] {} from {} on {} link\n", kind, from, link.as_str())
    }

    /// Format a relayed ICE candidate notification
    pub fn format_ice_candidate(from: &str, link: LinkKind, disposition: &str) -> String {
        format!(
            "\n[ice] candidate from {} on {} link ({})\n",
            from,
            link.as_str(),
            disposition
        )
    }

    /// Format a screen-share status notification
    pub fn format_screen_share_status(connection_id: &str, is_sharing: bool) -> String {
        if is_sharing {
            format!("\n[screen] {} started sharing\n", connection_id)
        } else {
            format!("\n[screen] {} stopped sharing\n", connection_id)
        }
    }

    /// Format a confirmation message after sending
    pub fn format_sent_confirmation(sent_at: i64) -> String {
        let timestamp_str = timestamp_to_jst_rfc3339(sent_at);
        format!("sent at {}\n", timestamp_str)
    }

    /// Format a message that could not be parsed
    pub fn format_raw_message(text: &str) -> String {
        format!("\n[raw] {}\n", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mendan_server::domain::Role;

    #[test]
    fn test_format_room_users_lists_participants_sorted() {
        // テスト項目: 参加者が接続 ID 順に整形される
        // given (前提条件):
        let mut users = HashMap::new();
        users.insert(
            "conn-b".to_string(),
            RoomUserDto {
                role: Role::Candidate,
            },
        );
        users.insert(
            "conn-a".to_string(),
            RoomUserDto {
                role: Role::Recruiter,
            },
        );

        // when (操作):
        let output = MessageFormatter::format_room_users(&users);

        // then (期待する結果):
        let pos_a = output.find("conn-a - recruiter").unwrap();
        let pos_b = output.find("conn-b - candidate").unwrap();
        assert!(pos_a < pos_b);
    }

    #[test]
    fn test_format_room_users_when_alone() {
        // テスト項目: 他の参加者が居ない場合の表示
        // given (前提条件):
        let users = HashMap::new();

        // when (操作):
        let output = MessageFormatter::format_room_users(&users);

        // then (期待する結果):
        assert!(output.contains("(You are alone)"));
    }

    #[test]
    fn test_format_chat_history_is_empty_for_no_messages() {
        // テスト項目: 履歴が空の場合は何も表示しない
        // given (前提条件):
        let messages: Vec<ChatMessageDto> = Vec::new();

        // when (操作):
        let output = MessageFormatter::format_chat_history(&messages);

        // then (期待する結果):
        assert!(output.is_empty());
    }

    #[test]
    fn test_format_signal_names_the_link_kind() {
        // テスト項目: signal の表示に camera / screen のリンク種別が含まれる
        // given (前提条件):

        // when (操作):
        let camera = MessageFormatter::format_signal("conn-r", "offer", LinkKind::Camera);
        let screen = MessageFormatter::format_signal("conn-r", "offer", LinkKind::Screen);

        // then (期待する結果):
        assert!(camera.contains("camera link"));
        assert!(screen.contains("screen link"));
    }
}
