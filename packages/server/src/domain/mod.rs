//! Domain layer: entities, value objects, and the interfaces the
//! infrastructure layer implements (dependency inversion).

pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod registry;
pub mod value_object;

pub use entity::{ChatMessage, CodeSnapshot, CodeStateEntry, Participant, Room};
pub use error::DomainError;
pub use message_pusher::{MessagePushError, MessagePusher, PusherChannel};
pub use registry::RoomRegistry;
pub use value_object::{
    ConnectionId, ConnectionIdFactory, MessageContent, QuestionId, Role, SessionKey, SignalKind,
    Timestamp,
};
