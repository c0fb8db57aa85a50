//! Live-channel wire protocol.
//!
//! The socket speaks JSON envelopes of the form `{"event": ..., "data": ...}`.
//! Two events exist: `joinRoom` subscribes the connection to a two-party
//! room, and `privateMessage` carries a chat message. The server's
//! `privateMessage` broadcast echoes the sender's payload with a timestamp
//! attached; there is no leave event, so subscriptions are additive for the
//! life of the connection.

use serde::{Deserialize, Serialize};

use crate::message::Message;

/// Events published by the client on the live channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// Subscribe to the room for the given email pair. Additive at the
    /// transport layer; the server derives the room key itself.
    #[serde(rename = "joinRoom")]
    JoinRoom {
        user_email1: String,
        user_email2: String,
    },

    /// Publish a chat message. No timestamp on the way out; the server
    /// stamps it.
    #[serde(rename = "privateMessage")]
    PrivateMessage {
        sender_email: String,
        receiver_email: String,
        content: String,
    },
}

/// Events delivered by the server on the live channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// A same-room broadcast, sender's own messages included.
    #[serde(rename = "privateMessage")]
    PrivateMessage(Message),
}

impl ClientEvent {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl ServerEvent {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
