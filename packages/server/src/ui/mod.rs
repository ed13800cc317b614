//! UI layer: axum router, WebSocket / HTTP handlers, shutdown signal.

pub mod handler;
pub mod server;
pub mod signal;
pub mod state;

pub use server::Server;
pub use state::AppState;
