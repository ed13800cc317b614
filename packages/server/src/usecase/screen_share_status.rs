//! UseCase: 画面共有状態通知処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ScreenShareStatusUseCase::broadcast_to_others() メソッド
//! - 送信者以外へのブロードキャスト対象選定
//!
//! ### なぜこのテストが必要か
//! - 画面共有状態は保存されない純粋な通知であり、送信者自身には届かない
//!   ことを保証
//! - 未知のセッションキーで何も起こらないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：共有開始・停止の通知
//! - 異常系：未知のルームからの通知

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, RoomRegistry, SessionKey};

/// 画面共有状態通知のユースケース
///
/// 状態は保存しない。通知は送信者以外の参加者にのみ届く。
pub struct ScreenShareStatusUseCase {
    /// Registry（ルームテーブルの抽象化）
    registry: Arc<dyn RoomRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl ScreenShareStatusUseCase {
    /// 新しい ScreenShareStatusUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// 画面共有状態を送信者以外の参加者にブロードキャスト
    ///
    /// 未知のセッションキーでは対象が空になり、何も送信されない。
    ///
    /// # Arguments
    ///
    /// * `session_key` - 対象ルームのセッションキー
    /// * `sender` - 通知の送信元（ブロードキャストから除外される）
    /// * `message` - ブロードキャストするメッセージ（JSON）
    pub async fn broadcast_to_others(
        &self,
        session_key: &SessionKey,
        sender: &ConnectionId,
        message: &str,
    ) -> Result<(), String> {
        let targets: Vec<ConnectionId> = self
            .registry
            .participants(session_key)
            .await
            .into_iter()
            .map(|p| p.id)
            .filter(|id| id != sender)
            .collect();

        self.message_pusher
            .broadcast(targets, message)
            .await
            .map_err(|e| e.to_string())
    }
}
