//! WebSocket upgrade handler for live poll results.
//!
//! Manages the connection lifecycle:
//! 1. Upgrade to WebSocket and open a broadcast `Connection`
//! 2. Join and leave polls on client request
//! 3. Forward coalesced poll updates and direct replies to the client
//! 4. Drop every subscription on disconnect

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc::{self, error::SendError};

use crate::application::broadcast::{Connection, ConnectionReceiver, SubscriptionRegistry};
use crate::application::handlers::poll::GetResultsHandler;
use crate::domain::foundation::{ErrorCode, PollId, Timestamp};
use crate::domain::poll::PollError;

use super::messages::{ClientMessage, ConnectedMessage, PollRef, ServerMessage};

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    /// Registry shared with the broadcast coordinator.
    pub registry: Arc<SubscriptionRegistry>,
    /// Used for the snapshot sent on join.
    pub results: Arc<GetResultsHandler>,
    /// Capacity of the per-connection queue for direct replies.
    pub reply_buffer: usize,
}

impl WebSocketState {
    pub fn new(
        registry: Arc<SubscriptionRegistry>,
        results: Arc<GetResultsHandler>,
        reply_buffer: usize,
    ) -> Self {
        Self {
            registry,
            results,
            reply_buffer: reply_buffer.max(1),
        }
    }
}

/// Handle WebSocket upgrade requests.
///
/// Route: `GET /ws`
///
/// Viewing results needs no authentication, matching anonymous voting.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<WebSocketState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an established WebSocket connection.
///
/// Runs for the lifetime of the connection.
async fn handle_socket(socket: WebSocket, state: WebSocketState) {
    let (mut sender, mut receiver) = socket.split();

    let (connection, mut updates) = Connection::open();
    let connection_id = connection.id();
    let (reply_tx, mut reply_rx) = mpsc::channel::<ServerMessage>(state.reply_buffer);

    let connected = ServerMessage::Connected(ConnectedMessage {
        connection_id: connection_id.to_string(),
        timestamp: Timestamp::now().to_rfc3339(),
    });

    if let Err(e) = send_message(&mut sender, &connected).await {
        tracing::debug!("Failed to send connected message: {}", e);
        return; // Client disconnected immediately
    }

    tracing::debug!(connection_id = %connection_id, "WebSocket connected");

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = next_outgoing(&mut reply_rx, &mut updates).await {
            if let Err(e) = send_message(&mut sender, &msg).await {
                tracing::debug!(connection_id = %connection_id, "Send error, closing connection: {}", e);
                break;
            }
        }
    });

    let registry = Arc::clone(&state.registry);
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Text(text)) => {
                    let sent = match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(msg) => handle_client_message(msg, &connection, &state, &reply_tx).await,
                        Err(e) => {
                            let error = ServerMessage::error(
                                ErrorCode::InvalidPayload,
                                format!("Unrecognised message: {}", e),
                            );
                            reply_tx.send(error).await
                        }
                    };
                    if sent.is_err() {
                        break;
                    }
                }
                Ok(Message::Binary(_)) => {
                    tracing::warn!(connection_id = %connection_id, "Received unsupported binary message");
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                    // Protocol-level heartbeats are answered by axum
                }
                Ok(Message::Close(_)) => {
                    tracing::debug!(connection_id = %connection_id, "Client sent close frame");
                    break;
                }
                Err(e) => {
                    tracing::debug!(connection_id = %connection_id, "Receive error: {}", e);
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    let dropped = registry.unsubscribe_all(connection_id).await;
    tracing::debug!(connection_id = %connection_id, subscriptions = dropped, "WebSocket disconnected");
}

/// Next message for the client, or `None` once both sources are closed.
///
/// A queued direct reply always goes out before any pending update.
async fn next_outgoing(
    replies: &mut mpsc::Receiver<ServerMessage>,
    updates: &mut ConnectionReceiver,
) -> Option<ServerMessage> {
    tokio::select! {
        biased;
        Some(reply) = replies.recv() => Some(reply),
        Some(update) = updates.next_update() => Some(ServerMessage::PollUpdate((*update).clone())),
        else => None,
    }
}

/// Apply one client request, queueing its direct reply.
///
/// Fails only when the reply queue is closed.
async fn handle_client_message(
    msg: ClientMessage,
    connection: &Connection,
    state: &WebSocketState,
    replies: &mpsc::Sender<ServerMessage>,
) -> Result<(), SendError<ServerMessage>> {
    match msg {
        ClientMessage::JoinPoll(PollRef { poll_id }) => {
            join_poll(poll_id, connection, state, replies).await
        }
        ClientMessage::LeavePoll(PollRef { poll_id }) => {
            state.registry.unsubscribe(connection.id(), poll_id).await;
            connection.forget(poll_id);
            replies.send(ServerMessage::Left(PollRef { poll_id })).await
        }
        ClientMessage::Ping => replies.send(ServerMessage::Pong).await,
    }
}

/// Confirm the join, subscribe, then hand the current aggregate to the
/// connection.
///
/// `joined` is queued before the subscription exists, so no update for the
/// poll can reach the client ahead of it. Subscribing before the snapshot
/// means a vote landing in between is still broadcast; the connection keeps
/// whichever aggregate is newer.
async fn join_poll(
    poll_id: PollId,
    connection: &Connection,
    state: &WebSocketState,
    replies: &mpsc::Sender<ServerMessage>,
) -> Result<(), SendError<ServerMessage>> {
    match state.results.exists(poll_id).await {
        Ok(true) => {}
        Ok(false) => return replies.send(join_failed(PollError::NotFound(poll_id))).await,
        Err(e) => return replies.send(join_failed(e)).await,
    }

    replies.send(ServerMessage::Joined(PollRef { poll_id })).await?;
    state.registry.subscribe(connection, poll_id).await;

    match state.results.handle(poll_id).await {
        Ok(results) => {
            // A closed receiver means the socket is going away; cleanup follows.
            let _ = connection.deliver(Arc::new(results));
            Ok(())
        }
        Err(e) => {
            state.registry.unsubscribe(connection.id(), poll_id).await;
            connection.forget(poll_id);
            replies.send(join_failed(e)).await
        }
    }
}

fn join_failed(e: PollError) -> ServerMessage {
    match e {
        PollError::NotFound(_) => ServerMessage::error(e.code(), e.to_string()),
        other => {
            tracing::warn!(error = %other, "Join snapshot failed");
            ServerMessage::error(ErrorCode::InternalError, "Could not load poll results")
        }
    }
}

/// Send a JSON message over the WebSocket.
async fn send_message(
    sender: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: &ServerMessage,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(msg).map_err(axum::Error::new)?;
    sender.send(Message::Text(json)).await
}

/// Create axum router for the WebSocket endpoint.
pub fn websocket_router(state: WebSocketState) -> axum::Router {
    use axum::routing::get;

    axum::Router::new()
        .route("/ws", get(ws_handler))
        .with_state(state)
}
