//! UseCase: ルーム参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - ルーム参加処理（ルーム作成、参加者追加、参加スナップショット構築）
//!
//! ### なぜこのテストが必要か
//! - 初回参加でルームが作成されることを保証
//! - 参加スナップショット（他の参加者・チャット履歴・コード状態）が
//!   参加処理完了時点のルーム状態と一致することを確認
//! - 参加者本人がスナップショットの参加者マップに含まれないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：空のルームへの初回参加、既存ルームへの 2 人目の参加
//! - エッジケース：同じ接続の再参加（ロール上書き）
//! - 再接続：履歴・コード状態が残っているルームへの参加

use std::sync::Arc;

use crate::domain::{
    ChatMessage, CodeSnapshot, ConnectionId, MessagePushError, MessagePusher, Participant, Role,
    RoomRegistry, SessionKey,
};

/// 参加処理の結果
///
/// 参加処理完了時点のルーム状態のスナップショット。この 1 つの join に
/// 対する 4 つの応答（user-joined / room-users / chat-history / code-state）
/// は全てこのスナップショットから構築されるため、部分的なスナップショット
/// になることはない。
#[derive(Debug)]
pub struct JoinOutcome {
    /// 参加者本人を除く、参加処理完了時点の参加者リスト
    pub others: Vec<Participant>,
    /// チャット履歴の全量（追記順）
    pub history: Vec<ChatMessage>,
    /// コード状態のスナップショットと現在の質問カーソル
    pub snapshot: CodeSnapshot,
}

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    /// Registry（ルームテーブルの抽象化）
    registry: Arc<dyn RoomRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// ルーム参加を実行
    ///
    /// ルームを冪等に作成し、参加者を追加した上で、参加スナップショットを返す。
    /// ロールの一意性は検証しない（先勝ち、検証なしのドメイン決定）。
    ///
    /// # Arguments
    ///
    /// * `session_key` - 参加するルームのセッションキー
    /// * `connection_id` - 参加する接続の ID
    /// * `role` - 宣言されたロール
    pub async fn execute(
        &self,
        session_key: &SessionKey,
        connection_id: ConnectionId,
        role: Role,
    ) -> JoinOutcome {
        // 1. ルームを冪等に作成
        self.registry.ensure_room(session_key).await;

        // 2. 参加者を追加
        self.registry
            .add_participant(session_key, connection_id.clone(), role)
            .await;

        // 3. 参加スナップショットを構築（参加者本人は除く）
        let others: Vec<Participant> = self
            .registry
            .participants(session_key)
            .await
            .into_iter()
            .filter(|p| p.id != connection_id)
            .collect();
        let history = self.registry.history(session_key).await;
        let snapshot = self
            .registry
            .code_snapshot(session_key)
            .await
            .unwrap_or_else(|| CodeSnapshot {
                code_state: std::collections::HashMap::new(),
                current_question_index: 0,
            });

        JoinOutcome {
            others,
            history,
            snapshot,
        }
    }

    /// 参加者が join したことを既存の参加者にブロードキャスト
    ///
    /// # Arguments
    ///
    /// * `session_key` - 参加したルームのセッションキー
    /// * `new_connection_id` - 新規参加した接続の ID
    /// * `message` - ブロードキャストするメッセージ（JSON）
    pub async fn broadcast_user_joined(
        &self,
        session_key: &SessionKey,
        new_connection_id: &ConnectionId,
        message: &str,
    ) -> Result<(), String> {
        let targets: Vec<ConnectionId> = self
            .registry
            .participants(session_key)
            .await
            .into_iter()
            .map(|p| p.id)
            .filter(|id| id != new_connection_id)
            .collect();

        self.message_pusher
            .broadcast(targets, message)
            .await
            .map_err(|e| e.to_string())
    }

    /// 参加スナップショットの 1 フレームを参加者本人に送信
    pub async fn deliver_to_joiner(
        &self,
        connection_id: &ConnectionId,
        message: &str,
    ) -> Result<(), MessagePushError> {
        self.message_pusher.push_to(connection_id, message).await
    }
}
