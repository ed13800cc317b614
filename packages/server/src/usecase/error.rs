//! UseCase 層のエラー型定義

use thiserror::Error;

/// ルーム読み取り系 UseCase のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoomQueryError {
    /// 指定されたセッションキーのルームが存在しない
    #[error("room not found")]
    RoomNotFound,
}
