//! UseCase layer: one usecase per protocol operation.
//!
//! Each usecase depends on the `RoomRegistry` and `MessagePusher` traits from
//! the domain layer, never on concrete infrastructure.

pub mod error;
pub mod join_room;
pub mod leave_room;
pub mod post_chat_message;
pub mod relay_signal;
pub mod room_query;
pub mod screen_share_status;
pub mod update_code;

pub use error::RoomQueryError;
pub use join_room::{JoinOutcome, JoinRoomUseCase};
pub use leave_room::LeaveRoomUseCase;
pub use post_chat_message::PostChatMessageUseCase;
pub use relay_signal::RelaySignalUseCase;
pub use room_query::RoomQueryUseCase;
pub use screen_share_status::ScreenShareStatusUseCase;
pub use update_code::UpdateCodeUseCase;
