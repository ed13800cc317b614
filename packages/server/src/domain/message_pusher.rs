//! MessagePusher trait 定義
//!
//! 接続中のクライアントへのメッセージ送信を抽象化します。
//! 具体的な実装（WebSocket）は Infrastructure 層が提供します。

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use super::value_object::ConnectionId;

/// クライアントへのメッセージ送信用チャンネル
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// メッセージ送信時に発生するエラー
#[derive(Debug, Error)]
pub enum MessagePushError {
    /// 宛先の接続が存在しない
    ///
    /// リレーにとっては致命的ではない。死んだ相手と遅い相手を送信側で
    /// 区別できないため、送信元にはエラーを返さず破棄する（ルーティング失敗）。
    #[error("connection '{0}' not found")]
    ClientNotFound(String),

    /// チャンネルへの送信失敗
    #[error("failed to push message: {0}")]
    PushFailed(String),
}

/// MessagePusher trait
///
/// UseCase 層はこの trait に依存し、WebSocket の存在を知らない。
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// クライアントの送信チャンネルを登録する
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// クライアントの送信チャンネルを登録解除する
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// 特定のクライアントにメッセージを送信する
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// 複数のクライアントにメッセージをブロードキャストする
    ///
    /// 一部の宛先への送信失敗は許容する（ログのみ）。
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        content: &str,
    ) -> Result<(), MessagePushError>;
}
