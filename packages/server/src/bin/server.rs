//! WebRTC signaling and collaboration relay server for live coding interviews.
//!
//! Relays offer/answer/ICE between a recruiter and a candidate, keeps
//! per-question collaborative code state, and replays room-scoped chat
//! history to late joiners.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin mendan-server
//! cargo run --bin mendan-server -- --host 0.0.0.0 --port 3000
//! ```

use std::sync::Arc;

use clap::Parser;

use mendan_server::{
    infrastructure::{
        message_pusher::WebSocketMessagePusher, registry::InMemoryRoomRegistry,
    },
    ui::{AppState, Server},
};
use mendan_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "mendan-server")]
#[command(about = "Signaling relay server for live coding interviews", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Registry (in-memory room table)
    // 2. MessagePusher (WebSocket implementation)
    // 3. AppState (usecases)
    // 4. Server

    let registry = Arc::new(InMemoryRoomRegistry::new());
    let message_pusher = Arc::new(WebSocketMessagePusher::new());
    let state = Arc::new(AppState::new(registry, message_pusher));

    let server = Server::new(state);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
