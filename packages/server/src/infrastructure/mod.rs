//! Infrastructure layer: concrete implementations of the domain interfaces
//! (in-memory room registry, WebSocket message pusher) and the DTOs for the
//! WebSocket / HTTP protocols.

pub mod dto;
pub mod message_pusher;
pub mod registry;
