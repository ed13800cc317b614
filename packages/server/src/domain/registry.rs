//! Room Registry trait 定義
//!
//! ドメイン層が必要とするルームテーブルへのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! Registry はプロセス全体で唯一の共有可変状態であり、グローバル変数ではなく
//! 明示的なオブジェクトとして UseCase 層に注入される。これによりテストでは
//! 独立した Registry インスタンスを使える。
//!
//! 未知のセッションキーに対する変更操作はエラーではなく no-op として扱う
//! （切断イベントとルーム破棄は競合しうるため、防御的に握りつぶす）。

use async_trait::async_trait;

use super::entity::{ChatMessage, CodeSnapshot, Participant, Room};
use super::value_object::{
    ConnectionId, MessageContent, QuestionId, Role, SessionKey, Timestamp,
};

/// Room Registry trait
///
/// ルームのライフサイクル（作成・破棄）と、各コンポーネントがルーム状態を
/// 変更するためのアクセサを提供する。UseCase 層はこの trait に依存し、
/// Infrastructure 層の具体的な実装には依存しない。
#[async_trait]
pub trait RoomRegistry: Send + Sync {
    /// ルームを冪等に作成する（既に存在する場合は何もしない）
    async fn ensure_room(&self, session_key: &SessionKey);

    /// 参加者が 0 人になったルームを破棄する
    ///
    /// 参加者が残っているルームは決して破棄しない。冗長な呼び出しは安全。
    async fn destroy_room_if_empty(&self, session_key: &SessionKey);

    /// 参加者を追加する
    ///
    /// # Returns
    ///
    /// ルームが存在し追加できた場合 `true`
    async fn add_participant(
        &self,
        session_key: &SessionKey,
        connection_id: ConnectionId,
        role: Role,
    ) -> bool;

    /// 参加者を削除する
    ///
    /// # Returns
    ///
    /// 参加者が存在し削除された場合 `true`（未参加・未知のルームは `false`）
    async fn remove_participant(
        &self,
        session_key: &SessionKey,
        connection_id: &ConnectionId,
    ) -> bool;

    /// ルームの参加者リストを取得（接続 ID でソート済み）
    async fn participants(&self, session_key: &SessionKey) -> Vec<Participant>;

    /// ルームの参加者数を取得
    async fn count_participants(&self, session_key: &SessionKey) -> usize;

    /// チャットメッセージを追記する
    ///
    /// # Returns
    ///
    /// 採番済みの追記されたメッセージ（未知のルームは `None`）
    async fn append_message(
        &self,
        session_key: &SessionKey,
        content: MessageContent,
        sender_role: Role,
        now: Timestamp,
    ) -> Option<ChatMessage>;

    /// ルームのチャット履歴を取得（追記順）
    async fn history(&self, session_key: &SessionKey) -> Vec<ChatMessage>;

    /// 質問のコード状態を置き換える（last-write-wins）
    ///
    /// # Returns
    ///
    /// ルームが存在し適用された場合 `true`
    async fn apply_code_update(
        &self,
        session_key: &SessionKey,
        question_id: QuestionId,
        code: String,
        language: String,
        editor: ConnectionId,
        now: Timestamp,
    ) -> bool;

    /// 質問の言語のみを変更する（エントリが無ければ空エントリを作成）
    async fn apply_language_change(
        &self,
        session_key: &SessionKey,
        question_id: QuestionId,
        language: String,
        editor: ConnectionId,
        now: Timestamp,
    ) -> bool;

    /// 共有の質問カーソルを更新する
    async fn set_current_question(&self, session_key: &SessionKey, index: u32) -> bool;

    /// コード状態のスナップショットを取得
    async fn code_snapshot(&self, session_key: &SessionKey) -> Option<CodeSnapshot>;

    /// ルームの複製を取得（HTTP の読み取り系エンドポイント用）
    async fn get_room(&self, session_key: &SessionKey) -> Option<Room>;

    /// 全ルームの複製を取得（HTTP の読み取り系エンドポイント用）
    async fn rooms(&self) -> Vec<Room>;
}
