//! InMemory Room Registry 実装
//!
//! ドメイン層が定義する RoomRegistry trait の具体的な実装。
//! セッションキー → Room の HashMap をインメモリ DB として使用します。
//!
//! テーブル全体を単一の tokio Mutex で保護することで、マルチスレッドの
//! ランタイム上でも 1 ルームへの変更が直列化される。
//! ロックは各変更操作の間だけ保持し、I/O の await を跨いで保持しない。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ChatMessage, CodeSnapshot, ConnectionId, MessageContent, Participant, QuestionId, Role, Room,
    RoomRegistry, SessionKey, Timestamp,
};
use mendan_shared::time::get_jst_timestamp;

/// インメモリ Room Registry 実装
///
/// プロセス起動時に 1 つ構築され、UseCase 層に注入される。
/// ルームの作成・破棄はこの実装の `ensure_room` / `destroy_room_if_empty`
/// のみが行う。
pub struct InMemoryRoomRegistry {
    /// セッションキー → Room のテーブル
    rooms: Mutex<HashMap<SessionKey, Room>>,
}

impl InMemoryRoomRegistry {
    /// 空の Registry を作成
    pub fn new() -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryRoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoomRegistry for InMemoryRoomRegistry {
    async fn ensure_room(&self, session_key: &SessionKey) {
        let mut rooms = self.rooms.lock().await;
        if !rooms.contains_key(session_key) {
            let room = Room::new(session_key.clone(), Timestamp::new(get_jst_timestamp()));
            rooms.insert(session_key.clone(), room);
            tracing::info!("Room '{}' created", session_key);
        }
    }

    async fn destroy_room_if_empty(&self, session_key: &SessionKey) {
        let mut rooms = self.rooms.lock().await;
        let is_empty = rooms
            .get(session_key)
            .map(|room| room.is_empty())
            .unwrap_or(false);
        if is_empty {
            rooms.remove(session_key);
            tracing::info!("Room '{}' destroyed (empty)", session_key);
        }
    }

    async fn add_participant(
        &self,
        session_key: &SessionKey,
        connection_id: ConnectionId,
        role: Role,
    ) -> bool {
        let mut rooms = self.rooms.lock().await;
        match rooms.get_mut(session_key) {
            Some(room) => {
                room.join(connection_id, role);
                true
            }
            None => false,
        }
    }

    async fn remove_participant(
        &self,
        session_key: &SessionKey,
        connection_id: &ConnectionId,
    ) -> bool {
        let mut rooms = self.rooms.lock().await;
        match rooms.get_mut(session_key) {
            Some(room) => room.leave(connection_id),
            None => false,
        }
    }

    async fn participants(&self, session_key: &SessionKey) -> Vec<Participant> {
        let rooms = self.rooms.lock().await;
        rooms
            .get(session_key)
            .map(|room| room.participant_list())
            .unwrap_or_default()
    }

    async fn count_participants(&self, session_key: &SessionKey) -> usize {
        let rooms = self.rooms.lock().await;
        rooms
            .get(session_key)
            .map(|room| room.participants.len())
            .unwrap_or(0)
    }

    async fn append_message(
        &self,
        session_key: &SessionKey,
        content: MessageContent,
        sender_role: Role,
        now: Timestamp,
    ) -> Option<ChatMessage> {
        let mut rooms = self.rooms.lock().await;
        rooms
            .get_mut(session_key)
            .map(|room| room.append_message(content, sender_role, now))
    }

    async fn history(&self, session_key: &SessionKey) -> Vec<ChatMessage> {
        let rooms = self.rooms.lock().await;
        rooms
            .get(session_key)
            .map(|room| room.messages.clone())
            .unwrap_or_default()
    }

    async fn apply_code_update(
        &self,
        session_key: &SessionKey,
        question_id: QuestionId,
        code: String,
        language: String,
        editor: ConnectionId,
        now: Timestamp,
    ) -> bool {
        let mut rooms = self.rooms.lock().await;
        match rooms.get_mut(session_key) {
            Some(room) => {
                room.apply_code_update(question_id, code, language, editor, now);
                true
            }
            None => false,
        }
    }

    async fn apply_language_change(
        &self,
        session_key: &SessionKey,
        question_id: QuestionId,
        language: String,
        editor: ConnectionId,
        now: Timestamp,
    ) -> bool {
        let mut rooms = self.rooms.lock().await;
        match rooms.get_mut(session_key) {
            Some(room) => {
                room.apply_language_change(question_id, language, editor, now);
                true
            }
            None => false,
        }
    }

    async fn set_current_question(&self, session_key: &SessionKey, index: u32) -> bool {
        let mut rooms = self.rooms.lock().await;
        match rooms.get_mut(session_key) {
            Some(room) => {
                room.set_current_question(index);
                true
            }
            None => false,
        }
    }

    async fn code_snapshot(&self, session_key: &SessionKey) -> Option<CodeSnapshot> {
        let rooms = self.rooms.lock().await;
        rooms.get(session_key).map(|room| room.code_snapshot())
    }

    async fn get_room(&self, session_key: &SessionKey) -> Option<Room> {
        let rooms = self.rooms.lock().await;
        rooms.get(session_key).cloned()
    }

    async fn rooms(&self) -> Vec<Room> {
        let rooms = self.rooms.lock().await;
        rooms.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - InMemoryRoomRegistry のルームライフサイクル（ensure / destroy_if_empty）
    // - 参加者・チャット・コード状態の変更がルームに反映されること
    // - 未知のセッションキーに対する変更が no-op になること
    //
    // 【なぜこのテストが必要か】
    // - Registry は UseCase から呼ばれる唯一の共有可変状態
    // - 「空のルームのみ破棄される」という不変条件を保証する必要がある
    // - 切断とルーム破棄の競合を no-op で吸収できることを検証する
    //
    // 【どのようなシナリオをテストするか】
    // 1. ensure_room の冪等性
    // 2. destroy_room_if_empty が空のルームのみ破棄すること
    // 3. 参加者追加・削除の成功ケース
    // 4. 未知のルームへの変更操作（no-op ケース）
    // 5. チャット履歴・コード状態の読み書き
    // ========================================

    fn key(s: &str) -> SessionKey {
        SessionKey::new(s.to_string()).unwrap()
    }

    fn conn(s: &str) -> ConnectionId {
        ConnectionId::new(s.to_string()).unwrap()
    }

    fn question(s: &str) -> QuestionId {
        QuestionId::new(s.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_ensure_room_is_idempotent() {
        // テスト項目: ensure_room を 2 回呼んでもルームの状態が失われない
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        registry.ensure_room(&key("i1")).await;
        registry
            .add_participant(&key("i1"), conn("r"), Role::Recruiter)
            .await;

        // when (操作):
        registry.ensure_room(&key("i1")).await;

        // then (期待する結果): 既存の参加者が保持されている
        assert_eq!(registry.count_participants(&key("i1")).await, 1);
    }

    #[tokio::test]
    async fn test_destroy_room_if_empty_removes_only_empty_rooms() {
        // テスト項目: 参加者が残っているルームは破棄されない
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        registry.ensure_room(&key("i1")).await;
        registry
            .add_participant(&key("i1"), conn("r"), Role::Recruiter)
            .await;

        // when (操作): 参加者が居る状態で破棄を試みる
        registry.destroy_room_if_empty(&key("i1")).await;

        // then (期待する結果): ルームは残っている
        assert!(registry.get_room(&key("i1")).await.is_some());

        // 参加者が 0 人になったら破棄される
        registry.remove_participant(&key("i1"), &conn("r")).await;
        registry.destroy_room_if_empty(&key("i1")).await;
        assert!(registry.get_room(&key("i1")).await.is_none());
    }

    #[tokio::test]
    async fn test_destroy_room_if_empty_is_safe_on_unknown_key() {
        // テスト項目: 存在しないルームの破棄は no-op になる
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();

        // when (操作):
        registry.destroy_room_if_empty(&key("ghost")).await;

        // then (期待する結果): パニックせず、何も起こらない
        assert!(registry.rooms().await.is_empty());
    }

    #[tokio::test]
    async fn test_mutations_on_unknown_room_are_noops() {
        // テスト項目: 未知のセッションキーへの変更操作が no-op になる
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        let now = Timestamp::new(1000);

        // when (操作):
        let added = registry
            .add_participant(&key("ghost"), conn("r"), Role::Recruiter)
            .await;
        let removed = registry.remove_participant(&key("ghost"), &conn("r")).await;
        let appended = registry
            .append_message(
                &key("ghost"),
                MessageContent::new("hello".to_string()).unwrap(),
                Role::Recruiter,
                now,
            )
            .await;
        let updated = registry
            .apply_code_update(
                &key("ghost"),
                question("q1"),
                "x".to_string(),
                "python".to_string(),
                conn("r"),
                now,
            )
            .await;
        let cursor_set = registry.set_current_question(&key("ghost"), 1).await;

        // then (期待する結果): 全て失敗扱いで、ルームは作成されていない
        assert!(!added);
        assert!(!removed);
        assert!(appended.is_none());
        assert!(!updated);
        assert!(!cursor_set);
        assert!(registry.rooms().await.is_empty());
    }

    #[tokio::test]
    async fn test_history_preserves_append_order() {
        // テスト項目: チャット履歴が追記順で取得できる
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        registry.ensure_room(&key("i1")).await;
        registry
            .append_message(
                &key("i1"),
                MessageContent::new("first".to_string()).unwrap(),
                Role::Recruiter,
                Timestamp::new(1000),
            )
            .await;
        registry
            .append_message(
                &key("i1"),
                MessageContent::new("second".to_string()).unwrap(),
                Role::Candidate,
                Timestamp::new(2000),
            )
            .await;

        // when (操作):
        let history = registry.history(&key("i1")).await;
        let history_again = registry.history(&key("i1")).await;

        // then (期待する結果): 追記順で、取得は冪等
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content.as_str(), "first");
        assert_eq!(history[1].content.as_str(), "second");
        assert_eq!(history, history_again);
    }

    #[tokio::test]
    async fn test_code_snapshot_returns_latest_state() {
        // テスト項目: スナップショットが最後の書き込みを反映する
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        registry.ensure_room(&key("i1")).await;
        registry
            .apply_code_update(
                &key("i1"),
                question("q1"),
                "print(1)".to_string(),
                "python".to_string(),
                conn("r"),
                Timestamp::new(1000),
            )
            .await;
        registry
            .apply_code_update(
                &key("i1"),
                question("q1"),
                "print(2)".to_string(),
                "python".to_string(),
                conn("c"),
                Timestamp::new(2000),
            )
            .await;
        registry.set_current_question(&key("i1"), 2).await;

        // when (操作):
        let snapshot = registry.code_snapshot(&key("i1")).await.unwrap();

        // then (期待する結果):
        assert_eq!(snapshot.current_question_index, 2);
        let entry = snapshot.code_state.get(&question("q1")).unwrap();
        assert_eq!(entry.code, "print(2)");
        assert_eq!(entry.last_editor, conn("c"));
    }

    #[tokio::test]
    async fn test_room_destruction_discards_history() {
        // テスト項目: ルーム破棄後に再作成したルームには履歴が残らない
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        registry.ensure_room(&key("i1")).await;
        registry
            .append_message(
                &key("i1"),
                MessageContent::new("hello".to_string()).unwrap(),
                Role::Recruiter,
                Timestamp::new(1000),
            )
            .await;
        registry.destroy_room_if_empty(&key("i1")).await;

        // when (操作):
        registry.ensure_room(&key("i1")).await;

        // then (期待する結果): 新しいルームは空
        assert!(registry.history(&key("i1")).await.is_empty());
        assert!(
            registry
                .code_snapshot(&key("i1"))
                .await
                .unwrap()
                .code_state
                .is_empty()
        );
    }
}
