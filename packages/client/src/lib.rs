//! CLI signaling client for the Mendan interview relay.
//!
//! Connects to the relay over WebSocket, joins an interview room with a
//! declared role, sends and receives chat, displays collaboration events,
//! and tracks the negotiation state of every peer link (camera and
//! screen-share) observed on the wire.

pub mod error;
pub mod formatter;
pub mod peer_link;
pub mod session;
pub mod ui;
