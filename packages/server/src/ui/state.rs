//! Server state and connection management.

use std::sync::Arc;

use crate::domain::{MessagePusher, RoomRegistry};
use crate::usecase::{
    JoinRoomUseCase, LeaveRoomUseCase, PostChatMessageUseCase, RelaySignalUseCase,
    RoomQueryUseCase, ScreenShareStatusUseCase, UpdateCodeUseCase,
};

/// Shared application state
pub struct AppState {
    /// JoinRoomUseCase（ルーム参加のユースケース）
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    /// LeaveRoomUseCase（ルーム退出のユースケース）
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    /// RelaySignalUseCase（シグナリング転送のユースケース）
    pub relay_signal_usecase: Arc<RelaySignalUseCase>,
    /// ScreenShareStatusUseCase（画面共有状態通知のユースケース）
    pub screen_share_status_usecase: Arc<ScreenShareStatusUseCase>,
    /// UpdateCodeUseCase（コード状態更新のユースケース）
    pub update_code_usecase: Arc<UpdateCodeUseCase>,
    /// PostChatMessageUseCase（チャット投稿のユースケース）
    pub post_chat_message_usecase: Arc<PostChatMessageUseCase>,
    /// RoomQueryUseCase（ルーム読み取りのユースケース）
    pub room_query_usecase: Arc<RoomQueryUseCase>,
    /// MessagePusher（接続ライフサイクルの登録・解除に使用）
    pub message_pusher: Arc<dyn MessagePusher>,
}

impl AppState {
    /// Registry と MessagePusher から全ユースケースを組み立てる
    pub fn new(registry: Arc<dyn RoomRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            join_room_usecase: Arc::new(JoinRoomUseCase::new(
                registry.clone(),
                message_pusher.clone(),
            )),
            leave_room_usecase: Arc::new(LeaveRoomUseCase::new(
                registry.clone(),
                message_pusher.clone(),
            )),
            relay_signal_usecase: Arc::new(RelaySignalUseCase::new(message_pusher.clone())),
            screen_share_status_usecase: Arc::new(ScreenShareStatusUseCase::new(
                registry.clone(),
                message_pusher.clone(),
            )),
            update_code_usecase: Arc::new(UpdateCodeUseCase::new(
                registry.clone(),
                message_pusher.clone(),
            )),
            post_chat_message_usecase: Arc::new(PostChatMessageUseCase::new(
                registry.clone(),
                message_pusher.clone(),
            )),
            room_query_usecase: Arc::new(RoomQueryUseCase::new(registry)),
            message_pusher,
        }
    }
}
