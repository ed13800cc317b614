//! UseCase: チャットメッセージ投稿処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - PostChatMessageUseCase::execute() メソッド
//! - メッセージの追記（id 採番）とブロードキャスト対象の選定
//!
//! ### なぜこのテストが必要か
//! - id がルーム内で単調増加することを保証（Scenario B）
//! - チャットは送信者を含む全員にブロードキャストされることを確認
//! - 未知のセッションキーへの投稿が no-op になることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：メッセージ投稿と全員へのブロードキャスト
//! - 異常系：参加したことのない・破棄済みのルームへの投稿

use std::sync::Arc;

use crate::domain::{
    ChatMessage, ConnectionId, MessageContent, MessagePusher, Role, RoomRegistry, SessionKey,
    Timestamp,
};
use mendan_shared::time::get_jst_timestamp;

/// チャットメッセージ投稿のユースケース
pub struct PostChatMessageUseCase {
    /// Registry（ルームテーブルの抽象化）
    registry: Arc<dyn RoomRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl PostChatMessageUseCase {
    /// 新しい PostChatMessageUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// チャットメッセージ投稿を実行
    ///
    /// ルームの履歴に追記し、採番済みのメッセージを返す。
    ///
    /// # Returns
    ///
    /// * `Some(ChatMessage)` - 追記されたメッセージ（id・タイムスタンプ採番済み）
    /// * `None` - ルームが存在しない（no-op、何もブロードキャストされない）
    pub async fn execute(
        &self,
        session_key: &SessionKey,
        content: MessageContent,
        sender_role: Role,
    ) -> Option<ChatMessage> {
        let now = Timestamp::new(get_jst_timestamp());
        self.registry
            .append_message(session_key, content, sender_role, now)
            .await
    }

    /// ブロードキャスト対象（送信者を含む全参加者）を取得
    pub async fn broadcast_targets(&self, session_key: &SessionKey) -> Vec<ConnectionId> {
        self.registry
            .participants(session_key)
            .await
            .into_iter()
            .map(|p| p.id)
            .collect()
    }

    /// メッセージを全参加者にブロードキャスト
    ///
    /// # Arguments
    ///
    /// * `targets` - ブロードキャスト対象の接続 ID リスト
    /// * `message` - ブロードキャストするメッセージ（JSON）
    pub async fn broadcast_message(
        &self,
        targets: Vec<ConnectionId>,
        message: &str,
    ) -> Result<(), String> {
        self.message_pusher
            .broadcast(targets, message)
            .await
            .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{
        message_pusher::WebSocketMessagePusher, registry::InMemoryRoomRegistry,
    };

    fn key(s: &str) -> SessionKey {
        SessionKey::new(s.to_string()).unwrap()
    }

    fn conn(s: &str) -> ConnectionId {
        ConnectionId::new(s.to_string()).unwrap()
    }

    fn content(s: &str) -> MessageContent {
        MessageContent::new(s.to_string()).unwrap()
    }

    async fn create_populated_usecase() -> (PostChatMessageUseCase, Arc<InMemoryRoomRegistry>) {
        let registry = Arc::new(InMemoryRoomRegistry::new());
        let message_pusher = Arc::new(WebSocketMessagePusher::new());
        registry.ensure_room(&key("i1")).await;
        registry
            .add_participant(&key("i1"), conn("r"), Role::Recruiter)
            .await;
        registry
            .add_participant(&key("i1"), conn("c"), Role::Candidate)
            .await;
        let usecase = PostChatMessageUseCase::new(registry.clone(), message_pusher);
        (usecase, registry)
    }

    #[tokio::test]
    async fn test_post_message_appends_to_history() {
        // テスト項目: 投稿がルームの履歴に追記される
        // given (前提条件):
        let (usecase, registry) = create_populated_usecase().await;

        // when (操作):
        let message = usecase
            .execute(&key("i1"), content("hello"), Role::Candidate)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(message.content.as_str(), "hello");
        assert_eq!(message.sender_role, Role::Candidate);
        let history = registry.history(&key("i1")).await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0], message);
    }

    #[tokio::test]
    async fn test_message_ids_increase_within_room() {
        // テスト項目: 同一ルーム内で id が投稿ごとに厳密に増加する
        // given (前提条件):
        let (usecase, _registry) = create_populated_usecase().await;

        // when (操作):
        let m1 = usecase
            .execute(&key("i1"), content("first"), Role::Recruiter)
            .await
            .unwrap();
        let m2 = usecase
            .execute(&key("i1"), content("second"), Role::Candidate)
            .await
            .unwrap();

        // then (期待する結果):
        assert!(m2.id > m1.id);
    }

    #[tokio::test]
    async fn test_broadcast_targets_include_sender() {
        // テスト項目: ブロードキャスト対象に送信者自身が含まれる
        // given (前提条件):
        let (usecase, _registry) = create_populated_usecase().await;

        // when (操作):
        let targets = usecase.broadcast_targets(&key("i1")).await;

        // then (期待する結果): 全参加者（送信者を含む）
        assert_eq!(targets.len(), 2);
        assert!(targets.contains(&conn("r")));
        assert!(targets.contains(&conn("c")));
    }

    #[tokio::test]
    async fn test_post_to_unknown_room_is_noop() {
        // テスト項目: 未知のセッションキーへの投稿が no-op になる
        // given (前提条件):
        let registry = Arc::new(InMemoryRoomRegistry::new());
        let message_pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = PostChatMessageUseCase::new(registry.clone(), message_pusher);

        // when (操作):
        let result = usecase
            .execute(&key("ghost"), content("hello"), Role::Recruiter)
            .await;

        // then (期待する結果): 何も追記されず、ルームも作成されない
        assert!(result.is_none());
        assert!(registry.rooms().await.is_empty());
    }
}
