//! UseCase: コード状態更新処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - UpdateCodeUseCase の update_code / change_question / change_language
//! - last-write-wins の上書き、質問カーソルの更新、言語のみの変更
//!
//! ### なぜこのテストが必要か
//! - 同じ質問への後勝ち上書きが保存・ブロードキャストの両方に反映されること
//!   を保証（Scenario C）
//! - update_code が共有カーソルを動かさないこと（カーソルを動かすのは
//!   question-change のみ）を確認
//! - 未知のセッションキーへの更新が no-op になることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：コード更新・質問変更・言語変更
//! - エッジケース：エントリが無い質問への言語変更（空エントリ作成）
//! - 異常系：未知のルームへの更新

use std::sync::Arc;

use crate::domain::{
    ConnectionId, MessagePusher, QuestionId, RoomRegistry, SessionKey, Timestamp,
};
use mendan_shared::time::get_jst_timestamp;

/// コード状態更新のユースケース
///
/// 3 つの操作は全て fire-and-forget・at-most-once 配信で、確認応答を持たない。
/// 同一質問への更新はサーバー受信順に直列化される（Registry のロックが司る）。
pub struct UpdateCodeUseCase {
    /// Registry（ルームテーブルの抽象化）
    registry: Arc<dyn RoomRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl UpdateCodeUseCase {
    /// 新しい UpdateCodeUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// 質問のコード状態を丸ごと置き換える（last-write-wins）
    ///
    /// 共有の質問カーソルは動かさない。
    ///
    /// # Returns
    ///
    /// * `Some(Timestamp)` - 適用されたサーバー時刻（ブロードキャストに載せる）
    /// * `None` - ルームが存在しない（no-op、何もブロードキャストされない）
    pub async fn update_code(
        &self,
        session_key: &SessionKey,
        question_id: QuestionId,
        code: String,
        language: String,
        editor: ConnectionId,
    ) -> Option<Timestamp> {
        let now = Timestamp::new(get_jst_timestamp());
        let applied = self
            .registry
            .apply_code_update(session_key, question_id, code, language, editor, now)
            .await;
        applied.then_some(now)
    }

    /// 共有の質問カーソルを更新する
    pub async fn change_question(
        &self,
        session_key: &SessionKey,
        current_question_index: u32,
    ) -> Option<Timestamp> {
        let now = Timestamp::new(get_jst_timestamp());
        let applied = self
            .registry
            .set_current_question(session_key, current_question_index)
            .await;
        applied.then_some(now)
    }

    /// 質問の言語のみを変更する（エントリが無ければ空エントリを作成）
    pub async fn change_language(
        &self,
        session_key: &SessionKey,
        question_id: QuestionId,
        language: String,
        editor: ConnectionId,
    ) -> Option<Timestamp> {
        let now = Timestamp::new(get_jst_timestamp());
        let applied = self
            .registry
            .apply_language_change(session_key, question_id, language, editor, now)
            .await;
        applied.then_some(now)
    }

    /// 更新を送信者を含む全参加者にブロードキャスト
    ///
    /// # Arguments
    ///
    /// * `session_key` - 対象ルームのセッションキー
    /// * `message` - ブロードキャストするメッセージ（JSON）
    pub async fn broadcast_to_room(
        &self,
        session_key: &SessionKey,
        message: &str,
    ) -> Result<(), String> {
        let targets: Vec<ConnectionId> = self
            .registry
            .participants(session_key)
            .await
            .into_iter()
            .map(|p| p.id)
            .collect();

        self.message_pusher
            .broadcast(targets, message)
            .await
            .map_err(|e| e.to_string())
    }
}
