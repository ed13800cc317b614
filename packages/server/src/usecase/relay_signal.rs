//! UseCase: シグナリング転送処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RelaySignalUseCase::deliver() メソッド
//! - 宛先 1 接続へのメッセージ転送と、ルーティング失敗時の握りつぶし
//!
//! ### なぜこのテストが必要か
//! - リレーは dumb pipe であり、ペイロードを検証せずそのまま届けることを保証
//! - 宛先不在（ルーティング失敗）が送信元へのエラーとして波及しないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：生きている宛先への転送
//! - 異常系：切断済みの宛先への転送（静かに破棄）

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePushError, MessagePusher};

/// シグナリング転送のユースケース
///
/// offer / answer / ICE candidate の転送は全て「宛先 1 接続に JSON を届ける」
/// という同じ操作になる。SDP・ICE の内容には一切関与しない（dumb pipe）。
/// ネゴシエーション状態機械の正しさはクライアント側の関心事。
pub struct RelaySignalUseCase {
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl RelaySignalUseCase {
    /// 新しい RelaySignalUseCase を作成
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// メッセージを宛先 1 接続に転送する
    ///
    /// 宛先が接続中でない場合は静かに破棄する。送信元は死んだ相手と遅い相手を
    /// 区別して行動できないため、エラーは返さない（クライアント側のタイムアウト
    /// がリトライを司る）。
    pub async fn deliver(&self, to: &ConnectionId, message: &str) {
        match self.message_pusher.push_to(to, message).await {
            Ok(()) => {}
            Err(MessagePushError::ClientNotFound(_)) => {
                tracing::debug!("Dropped relay message to disconnected target '{}'", to);
            }
            Err(e) => {
                tracing::warn!("Failed to relay message to '{}': {}", to, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MessagePusher, PusherChannel};
    use async_trait::async_trait;
    use mockall::mock;

    mock! {
        Pusher {}

        #[async_trait]
        impl MessagePusher for Pusher {
            async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);
            async fn unregister_client(&self, connection_id: &ConnectionId);
            async fn push_to(
                &self,
                connection_id: &ConnectionId,
                content: &str,
            ) -> Result<(), MessagePushError>;
            async fn broadcast(
                &self,
                targets: Vec<ConnectionId>,
                content: &str,
            ) -> Result<(), MessagePushError>;
        }
    }

    fn conn(s: &str) -> ConnectionId {
        ConnectionId::new(s.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_deliver_forwards_message_verbatim_to_target() {
        // テスト項目: メッセージが宛先にそのまま届けられる
        // given (前提条件):
        let mut pusher = MockPusher::new();
        pusher
            .expect_push_to()
            .withf(|id, content| id.as_str() == "c" && content == r#"{"type":"signal"}"#)
            .times(1)
            .returning(|_, _| Ok(()));
        let usecase = RelaySignalUseCase::new(Arc::new(pusher));

        // when (操作):
        usecase.deliver(&conn("c"), r#"{"type":"signal"}"#).await;

        // then (期待する結果): expect_push_to の times(1) で検証される
    }

    #[tokio::test]
    async fn test_deliver_drops_silently_when_target_missing() {
        // テスト項目: 宛先不在のときメッセージが静かに破棄される
        // given (前提条件):
        let mut pusher = MockPusher::new();
        pusher
            .expect_push_to()
            .times(1)
            .returning(|id, _| Err(MessagePushError::ClientNotFound(id.as_str().to_string())));
        let usecase = RelaySignalUseCase::new(Arc::new(pusher));

        // when (操作): パニックもエラーも起こらないこと
        usecase.deliver(&conn("ghost"), r#"{"type":"signal"}"#).await;

        // then (期待する結果): deliver は戻り値を持たず、呼び出し側に波及しない
    }

    #[tokio::test]
    async fn test_deliver_tolerates_push_failure() {
        // テスト項目: 送信チャンネルの失敗も呼び出し側に波及しない
        // given (前提条件):
        let mut pusher = MockPusher::new();
        pusher
            .expect_push_to()
            .times(1)
            .returning(|_, _| Err(MessagePushError::PushFailed("channel closed".to_string())));
        let usecase = RelaySignalUseCase::new(Arc::new(pusher));

        // when (操作):
        usecase.deliver(&conn("c"), r#"{"type":"ice-candidate"}"#).await;

        // then (期待する結果): パニックしない
    }
}
