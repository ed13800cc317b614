//! WebSocket and HTTP request handlers.

pub mod http;
pub mod websocket;
