//! WebSocket client session management.

use futures_util::{SinkExt, StreamExt};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use mendan_server::domain::Role;
use mendan_server::infrastructure::dto::websocket::{ClientEvent, ServerEvent};
use mendan_shared::time::get_jst_timestamp;

use crate::{
    error::ClientError,
    formatter::MessageFormatter,
    peer_link::{CandidateOutcome, LinkKey, LinkKind, PeerLinkRegistry},
    ui::redisplay_prompt,
};

/// Client-side view of the relay session: the negotiation state of every
/// peer link observed on the wire.
struct SessionView {
    links: PeerLinkRegistry,
}

impl SessionView {
    fn new() -> Self {
        Self {
            links: PeerLinkRegistry::new(),
        }
    }
}

/// Run the WebSocket client session
pub async fn run_client_session(
    url: &str,
    session_key: &str,
    role: Role,
) -> Result<(), Box<dyn std::error::Error>> {
    let (ws_stream, _response) = connect_async(url)
        .await
        .map_err(|e| Box::new(ClientError::ConnectionError(e.to_string())))?;

    tracing::info!("Connected to signaling server at {}", url);
    println!(
        "\nJoined interview '{}' as {}. Type messages and press Enter to chat. Press Ctrl+C to exit.\n",
        session_key, role
    );

    let (mut write, mut read) = ws_stream.split();

    // Announce room and role before anything else
    let join = ClientEvent::JoinRoom {
        session_key: session_key.to_string(),
        role,
    };
    write
        .send(Message::Text(serde_json::to_string(&join)?.into()))
        .await?;

    let role_label = role.as_str().to_string();
    let role_label_for_read = role_label.clone();

    // Spawn a task to handle incoming events
    let mut read_task = tokio::spawn(async move {
        let mut view = SessionView::new();
        let mut connection_error = false;

        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    match serde_json::from_str::<ServerEvent>(&text) {
                        Ok(event) => handle_server_event(event, &mut view),
                        Err(e) => {
                            tracing::debug!("Unparsable frame: {}", e);
                            print!("{}", MessageFormatter::format_raw_message(&text));
                        }
                    }
                    redisplay_prompt(&role_label_for_read);
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    connection_error = true;
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    connection_error = true;
                    break;
                }
                _ => {}
            }
        }

        connection_error
    });

    // Create channel for rustyline input
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();

    // Spawn a blocking thread for rustyline (synchronous readline)
    let role_label_for_prompt = role_label.clone();
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        let prompt = format!("{}> ", role_label_for_prompt);

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            // Channel closed, exit thread
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    // Spawn a task to handle stdin input and send chat messages
    let session_key_for_write = session_key.to_string();
    let mut write_task = tokio::spawn(async move {
        let mut write_error = false;

        while let Some(line) = input_rx.recv().await {
            let event = ClientEvent::ChatMessage {
                session_key: session_key_for_write.clone(),
                content: line,
                role,
            };

            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to serialize message: {}", e);
                    continue;
                }
            };

            if let Err(e) = write.send(Message::Text(json.into())).await {
                tracing::warn!("Failed to send message: {}", e);
                write_error = true;
                break;
            }

            // Display sent timestamp and redisplay prompt
            let formatted = MessageFormatter::format_sent_confirmation(get_jst_timestamp());
            print!("\n{}", formatted);
            redisplay_prompt(&role_label);
        }

        write_error
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        read_result = &mut read_task => {
            write_task.abort();
            let connection_error = read_result.unwrap_or(false);
            if connection_error {
                return Err(Box::new(ClientError::ConnectionError(
                    "Connection lost".to_string(),
                )));
            }
        }
        write_result = &mut write_task => {
            read_task.abort();
            let write_error = write_result.unwrap_or(false);
            if write_error {
                return Err(Box::new(ClientError::ConnectionError(
                    "Connection lost".to_string(),
                )));
            }
        }
    }

    Ok(())
}

/// Apply one server event to the session view and print it.
fn handle_server_event(event: ServerEvent, view: &mut SessionView) {
    match event {
        ServerEvent::Welcome { connection_id } => {
            print!("{}", MessageFormatter::format_welcome(&connection_id));
        }
        ServerEvent::RoomUsers { users } => {
            print!("{}", MessageFormatter::format_room_users(&users));
        }
        ServerEvent::UserJoined {
            connection_id,
            role,
        } => {
            print!(
                "{}",
                MessageFormatter::format_user_joined(&connection_id, role.as_str())
            );
        }
        ServerEvent::UserLeft { connection_id } => {
            // Closing the camera link never touches the screen link and vice
            // versa; a departure closes whichever of the two existed.
            let closed = view.links.close_remote(&connection_id);
            print!(
                "{}",
                MessageFormatter::format_user_left(&connection_id, closed)
            );
        }
        ServerEvent::ChatHistory { messages } => {
            print!("{}", MessageFormatter::format_chat_history(&messages));
        }
        ServerEvent::ChatMessage {
            content,
            sender_role,
            timestamp,
            ..
        } => {
            print!(
                "{}",
                MessageFormatter::format_chat_message(sender_role.as_str(), &content, timestamp)
            );
        }
        ServerEvent::CodeState {
            code_state,
            current_question_index,
        } => {
            print!(
                "{}",
                MessageFormatter::format_code_state(code_state.len(), current_question_index)
            );
        }
        ServerEvent::CodeUpdate {
            question_id,
            language,
            timestamp,
            ..
        } => {
            print!(
                "{}",
                MessageFormatter::format_code_update(&question_id, &language, timestamp)
            );
        }
        ServerEvent::QuestionChange {
            question_id,
            current_question_index,
            ..
        } => {
            print!(
                "{}",
                MessageFormatter::format_question_change(&question_id, current_question_index)
            );
        }
        ServerEvent::LanguageChange {
            question_id,
            language,
            ..
        } => {
            print!(
                "{}",
                MessageFormatter::format_language_change(&question_id, &language)
            );
        }
        ServerEvent::Signal {
            from,
            kind,
            is_screen_share,
            ..
        } => {
            let link = LinkKind::from_flag(is_screen_share);
            let key = LinkKey::new(from.clone(), link);
            match kind {
                mendan_server::domain::SignalKind::Offer => {
                    let outcome = view.links.apply_remote_offer(&key);
                    if outcome.reset {
                        tracing::info!(
                            "Link to '{}' ({}) was in a conflicting state; recreated before applying the offer",
                            from,
                            link.as_str()
                        );
                    }
                    if !outcome.flushed.is_empty() {
                        tracing::debug!(
                            "Flushed {} queued ICE candidate(s) for '{}' ({})",
                            outcome.flushed.len(),
                            from,
                            link.as_str()
                        );
                    }
                }
                mendan_server::domain::SignalKind::Answer => {
                    match view.links.apply_remote_answer(&key) {
                        Ok(flushed) => {
                            if !flushed.is_empty() {
                                tracing::debug!(
                                    "Flushed {} queued ICE candidate(s) for '{}' ({})",
                                    flushed.len(),
                                    from,
                                    link.as_str()
                                );
                            }
                        }
                        Err(e) => {
                            // Never fatal; the link state is simply left as-is
                            tracing::warn!("Ignored answer from '{}': {}", from, e);
                        }
                    }
                }
            }
            print!(
                "{}",
                MessageFormatter::format_signal(&from, kind.as_str(), link)
            );
        }
        ServerEvent::IceCandidate {
            from,
            candidate,
            is_screen_share,
        } => {
            let link = LinkKind::from_flag(is_screen_share);
            let key = LinkKey::new(from.clone(), link);
            let disposition = match view.links.accept_candidate(&key, candidate) {
                CandidateOutcome::Applied => "applied",
                CandidateOutcome::Queued => "queued until remote description",
                CandidateOutcome::Discarded => "discarded, link closed",
            };
            print!(
                "{}",
                MessageFormatter::format_ice_candidate(&from, link, disposition)
            );
        }
        ServerEvent::ScreenShareStatus {
            connection_id,
            is_sharing,
        } => {
            print!(
                "{}",
                MessageFormatter::format_screen_share_status(&connection_id, is_sharing)
            );
        }
    }
}
