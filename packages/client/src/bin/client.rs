//! CLI signaling client for the Mendan interview relay.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin mendan-client -- --session-key i1 --role recruiter
//! cargo run --bin mendan-client -- --url ws://127.0.0.1:8080/ws --session-key i1 --role candidate
//! ```

use clap::Parser;

use mendan_client::{error::ClientError, session::run_client_session};
use mendan_server::domain::Role;
use mendan_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "mendan-client")]
#[command(about = "CLI signaling client for live coding interviews", long_about = None)]
struct Args {
    /// WebSocket URL of the signaling server
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8080/ws")]
    url: String,

    /// Session key of the interview room to join
    #[arg(short = 's', long)]
    session_key: String,

    /// Role to declare: 'recruiter' or 'candidate'
    #[arg(short = 'r', long, default_value = "candidate")]
    role: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    let role = match Role::try_from(args.role.as_str()) {
        Ok(role) => role,
        Err(_) => {
            eprintln!("{}", ClientError::InvalidRole(args.role));
            std::process::exit(2);
        }
    };

    if let Err(e) = run_client_session(&args.url, &args.session_key, role).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
