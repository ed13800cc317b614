//! UseCase: ルーム読み取り処理（HTTP API 用）
//!
//! ルーム状態を変更しない読み取り専用のユースケース。
//! デバッグ・観測用の HTTP エンドポイントから呼ばれる。

use std::sync::Arc;

use crate::domain::{Room, RoomRegistry, SessionKey};

use super::error::RoomQueryError;

/// ルーム読み取りのユースケース
pub struct RoomQueryUseCase {
    /// Registry（ルームテーブルの抽象化）
    registry: Arc<dyn RoomRegistry>,
}

impl RoomQueryUseCase {
    /// 新しい RoomQueryUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    /// 全ルームの複製を取得
    pub async fn rooms(&self) -> Vec<Room> {
        self.registry.rooms().await
    }

    /// 指定ルームの複製を取得
    pub async fn room_detail(&self, session_key: &SessionKey) -> Result<Room, RoomQueryError> {
        self.registry
            .get_room(session_key)
            .await
            .ok_or(RoomQueryError::RoomNotFound)
    }
}
