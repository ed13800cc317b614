//! WebSocket connection handlers.
//!
//! One socket per client. The server assigns a connection id at upgrade time,
//! announces it in a `welcome` frame, then dispatches every inbound event to
//! the usecase layer. A dropped or closed socket triggers the leave flow
//! exactly once.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::{Mutex, mpsc};

use crate::{
    domain::{ConnectionId, ConnectionIdFactory, MessageContent, QuestionId, SessionKey},
    infrastructure::dto::{
        conversion::{participants_to_user_map, snapshot_to_code_state},
        websocket::{ChatMessageDto, ClientEvent, ServerEvent},
    },
    ui::state::AppState,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Spawns a task that receives messages from the rx channel and pushes them to
/// the WebSocket sender.
///
/// This function handles the outbound message flow: frames addressed to this
/// connection (via the rx channel) are written to its WebSocket.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            // Send the message to this client
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

pub async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    // Assign a connection id for the lifetime of this socket
    let connection_id = ConnectionIdFactory::generate();

    // Create a channel for this connection to receive messages
    let (tx, rx) = mpsc::unbounded_channel();
    state
        .message_pusher
        .register_client(connection_id.clone(), tx)
        .await;

    let (mut sender, mut receiver) = socket.split();

    // Announce the assigned connection id before anything else
    let welcome = ServerEvent::Welcome {
        connection_id: connection_id.as_str().to_string(),
    };
    if let Err(e) = sender.send(Message::Text(welcome.to_json().into())).await {
        tracing::error!("Failed to send welcome to '{}': {}", connection_id, e);
        state.message_pusher.unregister_client(&connection_id).await;
        return;
    }
    tracing::info!("Connection '{}' established", connection_id);

    // The session this connection has joined; shared with the teardown path
    // so the leave flow runs exactly once after either task ends.
    let current_session: Arc<Mutex<Option<SessionKey>>> = Arc::new(Mutex::new(None));

    let mut send_task = pusher_loop(rx, sender);

    let state_clone = state.clone();
    let connection_id_clone = connection_id.clone();
    let session_clone = current_session.clone();

    // Spawn a task to receive events from this client
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    // Parse the incoming event; a malformed frame is dropped
                    // without touching any room state
                    match serde_json::from_str::<ClientEvent>(&text) {
                        Ok(event) => {
                            let mut session = session_clone.lock().await;
                            dispatch_event(&state_clone, &connection_id_clone, event, &mut session)
                                .await;
                        }
                        Err(e) => {
                            tracing::warn!(
                                "Dropped malformed frame from '{}': {}",
                                connection_id_clone,
                                e
                            );
                        }
                    }
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection_id_clone);
                    break;
                }
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // The transport reported closure: run the leave flow exactly once
    let session = current_session.lock().await.take();
    handle_disconnect(&state, &connection_id, session).await;

    state.message_pusher.unregister_client(&connection_id).await;
    tracing::info!("Connection '{}' closed", connection_id);
}

/// Dispatch one inbound event to the usecase layer.
///
/// `current_session` tracks the room this connection has joined; a
/// `join-room` for a different session implicitly leaves the previous one.
pub async fn dispatch_event(
    state: &Arc<AppState>,
    connection_id: &ConnectionId,
    event: ClientEvent,
    current_session: &mut Option<SessionKey>,
) {
    match event {
        ClientEvent::JoinRoom { session_key, role } => {
            let session_key = match SessionKey::new(session_key) {
                Ok(key) => key,
                Err(e) => {
                    tracing::warn!("Dropped join-room from '{}': {}", connection_id, e);
                    return;
                }
            };

            // One interview per connection: joining another session leaves
            // the previous one first
            if let Some(previous) = current_session.take() {
                if previous != session_key {
                    run_leave(state, connection_id, &previous).await;
                }
            }

            tracing::info!(
                "Connection '{}' joining room '{}' as {}",
                connection_id,
                session_key,
                role
            );

            let outcome = state
                .join_room_usecase
                .execute(&session_key, connection_id.clone(), role)
                .await;

            // (a) user-joined to every other participant
            let joined = ServerEvent::UserJoined {
                connection_id: connection_id.as_str().to_string(),
                role,
            };
            if let Err(e) = state
                .join_room_usecase
                .broadcast_user_joined(&session_key, connection_id, &joined.to_json())
                .await
            {
                tracing::warn!("Failed to broadcast user-joined: {}", e);
            }

            // (b) room-users, (c) chat-history, (d) code-state to the joiner
            let room_users = ServerEvent::RoomUsers {
                users: participants_to_user_map(outcome.others),
            };
            let chat_history = ServerEvent::ChatHistory {
                messages: outcome
                    .history
                    .into_iter()
                    .map(ChatMessageDto::from)
                    .collect(),
            };
            let code_state = snapshot_to_code_state(outcome.snapshot);
            for frame in [room_users, chat_history, code_state] {
                if let Err(e) = state
                    .join_room_usecase
                    .deliver_to_joiner(connection_id, &frame.to_json())
                    .await
                {
                    tracing::warn!("Failed to deliver join snapshot to '{}': {}", connection_id, e);
                }
            }

            *current_session = Some(session_key);
        }

        ClientEvent::Signal {
            to,
            from,
            signal,
            kind,
            is_screen_share,
        } => {
            let to = match ConnectionId::new(to) {
                Ok(id) => id,
                Err(e) => {
                    tracing::warn!("Dropped signal from '{}': {}", connection_id, e);
                    return;
                }
            };
            tracing::debug!(
                "Relaying {} from '{}' to '{}'{}",
                kind.as_str(),
                from,
                to,
                if is_screen_share { " (screen share)" } else { "" }
            );
            let event = ServerEvent::Signal {
                from,
                signal,
                kind,
                is_screen_share,
            };
            state.relay_signal_usecase.deliver(&to, &event.to_json()).await;
        }

        ClientEvent::IceCandidate {
            to,
            candidate,
            is_screen_share,
        } => {
            let to = match ConnectionId::new(to) {
                Ok(id) => id,
                Err(e) => {
                    tracing::warn!("Dropped ice-candidate from '{}': {}", connection_id, e);
                    return;
                }
            };
            tracing::debug!(
                "Relaying ICE candidate from '{}' to '{}'{}",
                connection_id,
                to,
                if is_screen_share { " (screen share)" } else { "" }
            );
            let event = ServerEvent::IceCandidate {
                from: connection_id.as_str().to_string(),
                candidate,
                is_screen_share,
            };
            state.relay_signal_usecase.deliver(&to, &event.to_json()).await;
        }

        ClientEvent::ScreenShareStatus {
            session_key,
            is_sharing,
        } => {
            let session_key = match SessionKey::new(session_key) {
                Ok(key) => key,
                Err(e) => {
                    tracing::warn!("Dropped screen-share-status from '{}': {}", connection_id, e);
                    return;
                }
            };
            let event = ServerEvent::ScreenShareStatus {
                connection_id: connection_id.as_str().to_string(),
                is_sharing,
            };
            if let Err(e) = state
                .screen_share_status_usecase
                .broadcast_to_others(&session_key, connection_id, &event.to_json())
                .await
            {
                tracing::warn!("Failed to broadcast screen-share-status: {}", e);
            }
        }

        ClientEvent::CodeUpdate {
            session_key,
            question_id,
            code,
            language,
            current_question_index,
        } => {
            let (session_key, question) =
                match parse_room_question(&session_key, &question_id, connection_id, "code-update")
                {
                    Some(parsed) => parsed,
                    None => return,
                };
            let applied = state
                .update_code_usecase
                .update_code(
                    &session_key,
                    question,
                    code.clone(),
                    language.clone(),
                    connection_id.clone(),
                )
                .await;
            if let Some(timestamp) = applied {
                let event = ServerEvent::CodeUpdate {
                    question_id,
                    code,
                    language,
                    current_question_index,
                    timestamp: timestamp.value(),
                };
                if let Err(e) = state
                    .update_code_usecase
                    .broadcast_to_room(&session_key, &event.to_json())
                    .await
                {
                    tracing::warn!("Failed to broadcast code-update: {}", e);
                }
            }
        }

        ClientEvent::QuestionChange {
            session_key,
            question_id,
            current_question_index,
        } => {
            let session_key = match SessionKey::new(session_key) {
                Ok(key) => key,
                Err(e) => {
                    tracing::warn!("Dropped question-change from '{}': {}", connection_id, e);
                    return;
                }
            };
            let applied = state
                .update_code_usecase
                .change_question(&session_key, current_question_index)
                .await;
            if let Some(timestamp) = applied {
                let event = ServerEvent::QuestionChange {
                    question_id,
                    current_question_index,
                    timestamp: timestamp.value(),
                };
                if let Err(e) = state
                    .update_code_usecase
                    .broadcast_to_room(&session_key, &event.to_json())
                    .await
                {
                    tracing::warn!("Failed to broadcast question-change: {}", e);
                }
            }
        }

        ClientEvent::LanguageChange {
            session_key,
            question_id,
            language,
            current_question_index,
        } => {
            let (session_key, question) = match parse_room_question(
                &session_key,
                &question_id,
                connection_id,
                "language-change",
            ) {
                Some(parsed) => parsed,
                None => return,
            };
            let applied = state
                .update_code_usecase
                .change_language(
                    &session_key,
                    question,
                    language.clone(),
                    connection_id.clone(),
                )
                .await;
            if let Some(timestamp) = applied {
                let event = ServerEvent::LanguageChange {
                    question_id,
                    language,
                    current_question_index,
                    timestamp: timestamp.value(),
                };
                if let Err(e) = state
                    .update_code_usecase
                    .broadcast_to_room(&session_key, &event.to_json())
                    .await
                {
                    tracing::warn!("Failed to broadcast language-change: {}", e);
                }
            }
        }

        ClientEvent::ChatMessage {
            session_key,
            content,
            role,
        } => {
            let session_key = match SessionKey::new(session_key) {
                Ok(key) => key,
                Err(e) => {
                    tracing::warn!("Dropped chat-message from '{}': {}", connection_id, e);
                    return;
                }
            };
            let content = match MessageContent::new(content) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!("Dropped chat-message from '{}': {}", connection_id, e);
                    return;
                }
            };
            let posted = state
                .post_chat_message_usecase
                .execute(&session_key, content, role)
                .await;
            if let Some(message) = posted {
                let targets = state
                    .post_chat_message_usecase
                    .broadcast_targets(&session_key)
                    .await;
                let dto = ChatMessageDto::from(message);
                let event = ServerEvent::ChatMessage {
                    id: dto.id,
                    content: dto.content,
                    sender_role: dto.sender_role,
                    timestamp: dto.timestamp,
                };
                if let Err(e) = state
                    .post_chat_message_usecase
                    .broadcast_message(targets, &event.to_json())
                    .await
                {
                    tracing::warn!("Failed to broadcast chat-message: {}", e);
                }
            } else {
                tracing::debug!(
                    "Dropped chat-message for unknown room from '{}'",
                    connection_id
                );
            }
        }
    }
}

/// The transport reported closure for this connection: leave the joined
/// session, if any.
pub async fn handle_disconnect(
    state: &Arc<AppState>,
    connection_id: &ConnectionId,
    session: Option<SessionKey>,
) {
    if let Some(session_key) = session {
        run_leave(state, connection_id, &session_key).await;
    }
}

async fn run_leave(state: &Arc<AppState>, connection_id: &ConnectionId, session_key: &SessionKey) {
    let notify_targets = state
        .leave_room_usecase
        .execute(session_key, connection_id)
        .await;

    if notify_targets.is_empty() {
        return;
    }

    let event = ServerEvent::UserLeft {
        connection_id: connection_id.as_str().to_string(),
    };
    if let Err(e) = state
        .leave_room_usecase
        .broadcast_user_left(notify_targets, &event.to_json())
        .await
    {
        tracing::warn!("Failed to broadcast user-left: {}", e);
    } else {
        tracing::info!(
            "Broadcasted user-left for '{}' in room '{}'",
            connection_id,
            session_key
        );
    }
}

fn parse_room_question(
    session_key: &str,
    question_id: &str,
    connection_id: &ConnectionId,
    event_name: &str,
) -> Option<(SessionKey, QuestionId)> {
    let session_key = match SessionKey::new(session_key.to_string()) {
        Ok(key) => key,
        Err(e) => {
            tracing::warn!("Dropped {} from '{}': {}", event_name, connection_id, e);
            return None;
        }
    };
    let question = match QuestionId::new(question_id.to_string()) {
        Ok(question) => question,
        Err(e) => {
            tracing::warn!("Dropped {} from '{}': {}", event_name, connection_id, e);
            return None;
        }
    };
    Some((session_key, question))
}
