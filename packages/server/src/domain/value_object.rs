//! Value Object 定義
//!
//! プロトコルで使われる識別子・列挙値を型として表現します。
//! 生成時にバリデーションを行い、不正な値がドメイン層に入らないようにします。

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// メッセージ内容の最大文字数
pub const MAX_MESSAGE_CONTENT_CHARS: usize = 4096;

/// インタビューセッション 1 件のシグナリングルームを識別する不透明なキー
///
/// 値そのものの意味（インタビュー ID 等）は外部のアプリケーション層の関心事で、
/// リレーは検証せずそのまま信頼する。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionKey(String);

impl SessionKey {
    /// 新しい SessionKey を作成（空文字は不可）
    pub fn new(value: String) -> Result<Self, DomainError> {
        if value.is_empty() {
            return Err(DomainError::EmptySessionKey);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for SessionKey {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 1 本のライブ接続を識別するサーバー採番の ID
///
/// 接続の生存期間のみ有効で、再接続で引き継がれることはない。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// 新しい ConnectionId を作成（空文字は不可）
    pub fn new(value: String) -> Result<Self, DomainError> {
        if value.is_empty() {
            return Err(DomainError::EmptyConnectionId);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ConnectionId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ConnectionId の採番ファクトリ
pub struct ConnectionIdFactory;

impl ConnectionIdFactory {
    /// UUID v4 で新しい ConnectionId を採番
    pub fn generate() -> ConnectionId {
        // UUID v4 は空文字にならないので new は必ず成功する
        ConnectionId(uuid::Uuid::new_v4().to_string())
    }
}

/// 参加者のロール
///
/// ドメイン上はルームごとに recruiter / candidate が 1 人ずつの想定だが、
/// リレーはロールの一意性を強制しない（先勝ち、検証なし）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Recruiter,
    Candidate,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Recruiter => "recruiter",
            Role::Candidate => "candidate",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "recruiter" => Ok(Role::Recruiter),
            "candidate" => Ok(Role::Candidate),
            other => Err(DomainError::UnknownRole(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// コード状態のキーとなる質問 ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    /// 新しい QuestionId を作成（空文字は不可）
    pub fn new(value: String) -> Result<Self, DomainError> {
        if value.is_empty() {
            return Err(DomainError::EmptyQuestionId);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for QuestionId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// チャットメッセージの内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageContent(String);

impl MessageContent {
    /// 新しい MessageContent を作成（空文字・長すぎる内容は不可）
    pub fn new(value: String) -> Result<Self, DomainError> {
        if value.is_empty() {
            return Err(DomainError::EmptyMessageContent);
        }
        let chars = value.chars().count();
        if chars > MAX_MESSAGE_CONTENT_CHARS {
            return Err(DomainError::MessageContentTooLong(chars));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageContent {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unix タイムスタンプ（JST、ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// セッション記述メッセージの種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Offer,
    Answer,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Offer => "offer",
            SignalKind::Answer => "answer",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_key_rejects_empty_string() {
        // テスト項目: 空文字から SessionKey を作成するとエラーになる
        // given (前提条件):
        let value = String::new();

        // when (操作):
        let result = SessionKey::new(value);

        // then (期待する結果):
        assert_eq!(result, Err(DomainError::EmptySessionKey));
    }

    #[test]
    fn test_session_key_accepts_opaque_value() {
        // テスト項目: 任意の非空文字列から SessionKey を作成できる
        // given (前提条件):
        let value = "interview-42".to_string();

        // when (操作):
        let key = SessionKey::new(value).unwrap();

        // then (期待する結果):
        assert_eq!(key.as_str(), "interview-42");
    }

    #[test]
    fn test_connection_id_factory_generates_unique_ids() {
        // テスト項目: ConnectionIdFactory が毎回異なる ID を採番する
        // given (前提条件):

        // when (操作):
        let id1 = ConnectionIdFactory::generate();
        let id2 = ConnectionIdFactory::generate();

        // then (期待する結果):
        assert_ne!(id1, id2);
        assert!(!id1.as_str().is_empty());
    }

    #[test]
    fn test_role_parses_known_values() {
        // テスト項目: ロール文字列が正しくパースされる
        // given (前提条件):

        // when (操作):
        let recruiter = Role::try_from("recruiter");
        let candidate = Role::try_from("candidate");

        // then (期待する結果):
        assert_eq!(recruiter, Ok(Role::Recruiter));
        assert_eq!(candidate, Ok(Role::Candidate));
    }

    #[test]
    fn test_role_rejects_unknown_value() {
        // テスト項目: 未知のロール文字列はエラーになる
        // given (前提条件):

        // when (操作):
        let result = Role::try_from("observer");

        // then (期待する結果):
        assert_eq!(result, Err(DomainError::UnknownRole("observer".to_string())));
    }

    #[test]
    fn test_role_serializes_lowercase() {
        // テスト項目: ロールがワイヤ上では小文字で表現される
        // given (前提条件):
        let role = Role::Recruiter;

        // when (操作):
        let json = serde_json::to_string(&role).unwrap();

        // then (期待する結果):
        assert_eq!(json, r#""recruiter""#);
    }

    #[test]
    fn test_message_content_rejects_empty_string() {
        // テスト項目: 空のメッセージ内容はエラーになる
        // given (前提条件):
        let value = String::new();

        // when (操作):
        let result = MessageContent::new(value);

        // then (期待する結果):
        assert_eq!(result, Err(DomainError::EmptyMessageContent));
    }

    #[test]
    fn test_message_content_rejects_too_long_string() {
        // テスト項目: 最大文字数を超えるメッセージ内容はエラーになる
        // given (前提条件):
        let value = "a".repeat(MAX_MESSAGE_CONTENT_CHARS + 1);

        // when (操作):
        let result = MessageContent::new(value);

        // then (期待する結果):
        assert_eq!(
            result,
            Err(DomainError::MessageContentTooLong(
                MAX_MESSAGE_CONTENT_CHARS + 1
            ))
        );
    }

    #[test]
    fn test_signal_kind_serializes_lowercase() {
        // テスト項目: シグナル種別がワイヤ上では小文字で表現される
        // given (前提条件):

        // when (操作):
        let offer = serde_json::to_string(&SignalKind::Offer).unwrap();
        let answer = serde_json::to_string(&SignalKind::Answer).unwrap();

        // then (期待する結果):
        assert_eq!(offer, r#""offer""#);
        assert_eq!(answer, r#""answer""#);
    }
}
