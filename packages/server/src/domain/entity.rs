//! ドメインエンティティ定義
//!
//! Room はインタビューセッション 1 件分の共有状態（参加者・チャット履歴・
//! 質問ごとのコード状態・現在の質問カーソル）を保持する集約ルート。
//! Room の状態は Room Registry 経由でのみ変更される。

use std::collections::HashMap;

use serde::Serialize;

use super::value_object::{ConnectionId, MessageContent, QuestionId, Role, SessionKey, Timestamp};

/// ルーム参加者（接続 ID と宣言されたロール）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    pub id: ConnectionId,
    pub role: Role,
}

/// チャットメッセージ
///
/// 追記後は不変。id はルーム内で単調増加し、追記順 = 配信順。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub id: i64,
    pub content: MessageContent,
    pub sender_role: Role,
    pub timestamp: Timestamp,
}

/// 質問 1 件分のコード状態
///
/// Last-write-wins: 更新は前の状態を完全に置き換える。マージも競合検出もしない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeStateEntry {
    pub code: String,
    pub language: String,
    pub last_updated: Timestamp,
    pub last_editor: ConnectionId,
}

/// 参加時に新規接続へ送るコード状態のスナップショット
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeSnapshot {
    pub code_state: HashMap<QuestionId, CodeStateEntry>,
    pub current_question_index: u32,
}

/// インタビューセッション 1 件分のルーム
#[derive(Debug, Clone, Serialize)]
pub struct Room {
    pub session_key: SessionKey,
    /// 接続 ID → ロールのマップ。ロールの一意性は強制しない（先勝ち）。
    pub participants: HashMap<ConnectionId, Role>,
    /// 追記専用のチャット履歴。ルームの生存期間中は無制限に保持する。
    pub messages: Vec<ChatMessage>,
    /// 質問 ID → コード状態のマップ
    pub code_state: HashMap<QuestionId, CodeStateEntry>,
    /// 参加者間で共有される現在の質問カーソル
    pub current_question_index: u32,
    pub created_at: Timestamp,
}

impl Room {
    /// 空のルームを作成
    pub fn new(session_key: SessionKey, created_at: Timestamp) -> Self {
        Self {
            session_key,
            participants: HashMap::new(),
            messages: Vec::new(),
            code_state: HashMap::new(),
            current_question_index: 0,
            created_at,
        }
    }

    /// 参加者を追加
    ///
    /// 同じ接続 ID で再参加した場合はロールを上書きする。
    pub fn join(&mut self, connection_id: ConnectionId, role: Role) {
        self.participants.insert(connection_id, role);
    }

    /// 参加者を削除
    ///
    /// # Returns
    ///
    /// 参加者が存在していた場合 `true`（冪等: 既に不在なら `false`）
    pub fn leave(&mut self, connection_id: &ConnectionId) -> bool {
        self.participants.remove(connection_id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// 参加者リストを構築（接続 ID でソート済み）
    pub fn participant_list(&self) -> Vec<Participant> {
        let mut participants: Vec<Participant> = self
            .participants
            .iter()
            .map(|(id, role)| Participant {
                id: id.clone(),
                role: *role,
            })
            .collect();

        // Sort by connection id for consistent ordering
        participants.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));

        participants
    }

    /// チャットメッセージを追記し、追記されたメッセージを返す
    ///
    /// id はタイムスタンプ由来だが、同一ミリ秒内の連続追記でも
    /// 厳密に単調増加するよう `max(now, last_id + 1)` で採番する。
    pub fn append_message(
        &mut self,
        content: MessageContent,
        sender_role: Role,
        now: Timestamp,
    ) -> ChatMessage {
        let id = match self.messages.last() {
            Some(last) => now.value().max(last.id + 1),
            None => now.value(),
        };
        let message = ChatMessage {
            id,
            content,
            sender_role,
            timestamp: now,
        };
        self.messages.push(message.clone());
        message
    }

    /// 質問のコード状態を丸ごと置き換える（last-write-wins）
    pub fn apply_code_update(
        &mut self,
        question_id: QuestionId,
        code: String,
        language: String,
        editor: ConnectionId,
        now: Timestamp,
    ) {
        self.code_state.insert(
            question_id,
            CodeStateEntry {
                code,
                language,
                last_updated: now,
                last_editor: editor,
            },
        );
    }

    /// 質問の言語のみを変更する
    ///
    /// エントリが存在しない場合は空のコードを持つエントリを新規作成する。
    pub fn apply_language_change(
        &mut self,
        question_id: QuestionId,
        language: String,
        editor: ConnectionId,
        now: Timestamp,
    ) {
        self.code_state
            .entry(question_id)
            .and_modify(|entry| {
                entry.language = language.clone();
                entry.last_updated = now;
                entry.last_editor = editor.clone();
            })
            .or_insert_with(|| CodeStateEntry {
                code: String::new(),
                language,
                last_updated: now,
                last_editor: editor,
            });
    }

    /// 共有の質問カーソルを更新する
    pub fn set_current_question(&mut self, index: u32) {
        self.current_question_index = index;
    }

    /// コード状態のスナップショットを取得
    pub fn code_snapshot(&self) -> CodeSnapshot {
        CodeSnapshot {
            code_state: self.code_state.clone(),
            current_question_index: self.current_question_index,
        }
    }
}
