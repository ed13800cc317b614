//! ドメイン層のエラー型定義

use thiserror::Error;

/// Value Object の生成時に発生するエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// セッションキーが空
    #[error("session key must not be empty")]
    EmptySessionKey,

    /// コネクション ID が空
    #[error("connection id must not be empty")]
    EmptyConnectionId,

    /// 質問 ID が空
    #[error("question id must not be empty")]
    EmptyQuestionId,

    /// メッセージ内容が空
    #[error("message content must not be empty")]
    EmptyMessageContent,

    /// メッセージ内容が長すぎる
    #[error("message content too long: {0} characters (max {max})", max = crate::domain::value_object::MAX_MESSAGE_CONTENT_CHARS)]
    MessageContentTooLong(usize),

    /// 不正なロール文字列
    #[error("unknown role: '{0}' (expected 'recruiter' or 'candidate')")]
    UnknownRole(String),
}
