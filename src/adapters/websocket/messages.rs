//! WebSocket message types for live poll results.
//!
//! Every frame is a JSON object tagged by `event`, with its payload under
//! `data`:
//! - Server → Client: connected, joined, left, poll_update, error, pong
//! - Client → Server: join_poll, leave_poll, ping

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ErrorCode, PollId};
use crate::domain::poll::PollResults;

// ============================================
// Server → Client Messages
// ============================================

/// All message types that can be sent from server to client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connection established.
    Connected(ConnectedMessage),

    /// Subscription to a poll confirmed.
    Joined(PollRef),

    /// Subscription to a poll removed.
    Left(PollRef),

    /// Fresh aggregate for a subscribed poll: `{poll_id, question, type, results}`.
    PollUpdate(PollResults),

    /// Error occurred.
    Error(ErrorMessage),

    /// Heartbeat response.
    Pong,
}

/// Sent once when the socket is accepted.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectedMessage {
    pub connection_id: String,
    pub timestamp: String,
}

/// Identifies the poll a message is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollRef {
    pub poll_id: PollId,
}

/// Error message sent to client.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorMessage {
    pub code: String,
    pub message: String,
}

impl ServerMessage {
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        ServerMessage::Error(ErrorMessage {
            code: code.to_string(),
            message: message.into(),
        })
    }
}

// ============================================
// Client → Server Messages
// ============================================

/// All message types a client may send.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Start receiving updates for a poll.
    JoinPoll(PollRef),

    /// Stop receiving updates for a poll.
    LeavePoll(PollRef),

    /// Heartbeat.
    Ping,
}
