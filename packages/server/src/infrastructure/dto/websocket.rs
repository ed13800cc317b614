//! WebSocket wire protocol DTOs.
//!
//! Every frame is a JSON object tagged by a kebab-case `type` field.
//! SDP and ICE payloads are carried as opaque `serde_json::Value`s: the relay
//! is a dumb pipe and never inspects negotiation content.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{Role, SignalKind};

/// クライアント → サーバーのイベント
///
/// 必須フィールドが欠けたフレームは serde がパースの時点で拒否するため、
/// 不正なペイロードがルーム状態に触れることはない（イベントは破棄される）。
/// Serialize はクライアント実装がフレームを組み立てるために使う。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// インタビュールームへの参加宣言
    JoinRoom { session_key: String, role: Role },
    /// セッション記述（offer / answer）の転送依頼
    Signal {
        to: String,
        from: String,
        signal: Value,
        kind: SignalKind,
        #[serde(default)]
        is_screen_share: bool,
    },
    /// ICE candidate の転送依頼
    IceCandidate {
        to: String,
        candidate: Value,
        #[serde(default)]
        is_screen_share: bool,
    },
    /// 画面共有状態の通知（状態は保存されない）
    ScreenShareStatus { session_key: String, is_sharing: bool },
    /// 質問のコード状態の更新
    CodeUpdate {
        session_key: String,
        question_id: String,
        code: String,
        language: String,
        current_question_index: u32,
    },
    /// 共有の質問カーソルの変更
    QuestionChange {
        session_key: String,
        question_id: String,
        current_question_index: u32,
    },
    /// 質問の言語のみの変更
    LanguageChange {
        session_key: String,
        question_id: String,
        language: String,
        current_question_index: u32,
    },
    /// チャットメッセージの投稿
    ChatMessage {
        session_key: String,
        content: String,
        role: Role,
    },
}

/// ルーム参加者 1 人分の情報（room-users / user-joined で使用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomUserDto {
    pub role: Role,
}

/// チャットメッセージの DTO
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessageDto {
    pub id: i64,
    pub content: String,
    pub sender_role: Role,
    pub timestamp: i64,
}

/// 質問 1 件分のコード状態の DTO
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeStateEntryDto {
    pub code: String,
    pub language: String,
    pub last_updated: i64,
    pub last_editor: String,
}

/// サーバー → クライアントのイベント
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// 接続直後にサーバー採番の接続 ID を通知する
    Welcome { connection_id: String },
    /// 参加時に送られる、自分以外の参加者マップ
    RoomUsers { users: HashMap<String, RoomUserDto> },
    /// 新しい参加者の通知（参加者本人以外へ）
    UserJoined { connection_id: String, role: Role },
    /// 参加者の退出通知
    UserLeft { connection_id: String },
    /// 参加時に送られるチャット履歴の全量リプレイ
    ChatHistory { messages: Vec<ChatMessageDto> },
    /// チャットメッセージのブロードキャスト（送信者を含む全員へ）
    ChatMessage {
        id: i64,
        content: String,
        sender_role: Role,
        timestamp: i64,
    },
    /// 参加時に送られるコード状態のスナップショット
    CodeState {
        code_state: HashMap<String, CodeStateEntryDto>,
        current_question_index: u32,
    },
    /// コード更新のブロードキャスト（送信者を含む全員へ）
    CodeUpdate {
        question_id: String,
        code: String,
        language: String,
        current_question_index: u32,
        timestamp: i64,
    },
    /// 質問カーソル変更のブロードキャスト
    QuestionChange {
        question_id: String,
        current_question_index: u32,
        timestamp: i64,
    },
    /// 言語変更のブロードキャスト
    LanguageChange {
        question_id: String,
        language: String,
        current_question_index: u32,
        timestamp: i64,
    },
    /// セッション記述の転送（宛先 1 接続のみ）
    Signal {
        from: String,
        signal: Value,
        kind: SignalKind,
        is_screen_share: bool,
    },
    /// ICE candidate の転送（宛先 1 接続のみ）
    IceCandidate {
        from: String,
        candidate: Value,
        is_screen_share: bool,
    },
    /// 画面共有状態の通知（送信者以外へ）
    ScreenShareStatus {
        connection_id: String,
        is_sharing: bool,
    },
}

impl ServerEvent {
    /// ワイヤ上の JSON 表現にシリアライズする
    ///
    /// DTO は serde でシリアライズ可能な型のみで構成されるため失敗しない。
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("ServerEvent serialization must not fail")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_event_join_room_parses() {
        // テスト項目: join-room イベントが正しくパースされる
        // given (前提条件):
        let json = r#"{"type":"join-room","session_key":"i1","role":"recruiter"}"#;

        // when (操作):
        let event: ClientEvent = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        assert_eq!(
            event,
            ClientEvent::JoinRoom {
                session_key: "i1".to_string(),
                role: Role::Recruiter,
            }
        );
    }

    #[test]
    fn test_client_event_signal_defaults_screen_share_flag() {
        // テスト項目: is_screen_share を省略した signal は false として扱われる
        // given (前提条件):
        let json = r#"{"type":"signal","to":"c","from":"r","signal":{"sdp":"v=0"},"kind":"offer"}"#;

        // when (操作):
        let event: ClientEvent = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        match event {
            ClientEvent::Signal {
                to,
                from,
                kind,
                is_screen_share,
                ..
            } => {
                assert_eq!(to, "c");
                assert_eq!(from, "r");
                assert_eq!(kind, SignalKind::Offer);
                assert!(!is_screen_share);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_client_event_rejects_missing_required_field() {
        // テスト項目: 必須フィールドが欠けたフレームはパースエラーになる
        // given (前提条件): content が欠けた chat-message
        let json = r#"{"type":"chat-message","session_key":"i1","role":"candidate"}"#;

        // when (操作):
        let result = serde_json::from_str::<ClientEvent>(json);

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_client_event_rejects_unknown_type() {
        // テスト項目: 未知のイベント種別はパースエラーになる
        // given (前提条件):
        let json = r#"{"type":"self-destruct","session_key":"i1"}"#;

        // when (操作):
        let result = serde_json::from_str::<ClientEvent>(json);

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_server_event_signal_round_trip_keeps_payload_verbatim() {
        // テスト項目: signal のペイロードが変更されずにそのまま転送される
        // given (前提条件):
        let payload = serde_json::json!({"sdp": "v=0...", "type": "offer"});
        let event = ServerEvent::Signal {
            from: "r".to_string(),
            signal: payload.clone(),
            kind: SignalKind::Offer,
            is_screen_share: true,
        };

        // when (操作):
        let json = event.to_json();
        let parsed: ServerEvent = serde_json::from_str(&json).unwrap();

        // then (期待する結果):
        match parsed {
            ServerEvent::Signal {
                from,
                signal,
                kind,
                is_screen_share,
            } => {
                assert_eq!(from, "r");
                assert_eq!(signal, payload);
                assert_eq!(kind, SignalKind::Offer);
                assert!(is_screen_share);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_server_event_uses_kebab_case_type_tags() {
        // テスト項目: サーバーイベントの type タグが kebab-case になっている
        // given (前提条件):
        let event = ServerEvent::UserJoined {
            connection_id: "c".to_string(),
            role: Role::Candidate,
        };

        // when (操作):
        let json = event.to_json();

        // then (期待する結果):
        assert!(json.contains(r#""type":"user-joined""#));
        assert!(json.contains(r#""role":"candidate""#));
    }
}
