//! UseCase: ルーム退出処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - LeaveRoomUseCase::execute() メソッド
//! - ルーム退出処理（参加者削除、通知対象選定、空ルームの破棄）
//!
//! ### なぜこのテストが必要か
//! - 退出が冪等であること（2 回の退出・未参加の退出が no-op）を保証
//! - 最後の参加者の退出でルームが破棄されることを確認
//! - 切断イベントとルーム破棄の競合（未知のセッションキー）を
//!   エラーにせず握りつぶせることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加者の退出と残存者への通知
//! - エッジケース：最後の参加者の退出（ルーム破棄）
//! - 異常系：未知のセッションキー・未参加の接続の退出試行

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, RoomRegistry, SessionKey};

/// ルーム退出のユースケース
pub struct LeaveRoomUseCase {
    /// Registry（ルームテーブルの抽象化）
    registry: Arc<dyn RoomRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl LeaveRoomUseCase {
    /// 新しい LeaveRoomUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// ルーム退出を実行
    ///
    /// 参加者を削除し、参加者が 0 人になったルームを破棄する。
    /// 未知のセッションキー・未参加の接続に対しては no-op。
    ///
    /// # Returns
    ///
    /// 退出通知の対象（残存参加者）の接続 ID リスト。
    /// no-op だった場合は空リスト（何も通知しない）。
    pub async fn execute(
        &self,
        session_key: &SessionKey,
        connection_id: &ConnectionId,
    ) -> Vec<ConnectionId> {
        // 1. 参加者を削除（未参加なら no-op で終了）
        let removed = self
            .registry
            .remove_participant(session_key, connection_id)
            .await;
        if !removed {
            tracing::debug!(
                "Leave for connection '{}' in room '{}' was a no-op",
                connection_id,
                session_key
            );
            return Vec::new();
        }

        // 2. 通知対象（残存参加者）を取得
        let notify_targets: Vec<ConnectionId> = self
            .registry
            .participants(session_key)
            .await
            .into_iter()
            .map(|p| p.id)
            .collect();

        // 3. 空になったルームを破棄
        self.registry.destroy_room_if_empty(session_key).await;

        notify_targets
    }

    /// 参加者が退出したことを残存参加者にブロードキャスト
    ///
    /// # Arguments
    ///
    /// * `target_ids` - ブロードキャスト対象の接続 ID リスト
    /// * `message` - ブロードキャストするメッセージ（JSON）
    pub async fn broadcast_user_left(
        &self,
        target_ids: Vec<ConnectionId>,
        message: &str,
    ) -> Result<(), String> {
        self.message_pusher
            .broadcast(target_ids, message)
            .await
            .map_err(|e| e.to_string())
    }
}
