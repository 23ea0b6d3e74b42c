//! Relay protocol messages in domain form.
//!
//! The wire representation lives in `infrastructure::dto::websocket`.

use serde_json::Value;

use super::{
    entity::Game,
    value_object::{GameKey, SessionId},
};

/// A message received from a connection.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// Bind the connection to a session (`None` means self-registration)
    Register { id: Option<SessionId> },
    /// Join or move to a game
    Join {
        game_key: GameKey,
        name: Value,
        cells: Value,
    },
    Update(UpdateKind),
    /// Anything the relay does not understand
    Unrecognized,
}

/// Sub-type of an `update` message.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateKind {
    /// Transient positional update, relayed as-is
    Blobs(Value),
    /// Full self state, replaces the sender's game projection
    SelfState(Value),
    Unrecognized(String),
}

impl InboundMessage {
    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Register { .. } => "register",
            Self::Join { .. } => "join",
            Self::Update(UpdateKind::Blobs(_)) => "update/blobs",
            Self::Update(UpdateKind::SelfState(_)) => "update/self",
            Self::Update(UpdateKind::Unrecognized(_)) => "update/unknown",
            Self::Unrecognized => "unknown",
        }
    }
}

/// A message sent to one or more connections.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    /// Registration acknowledgement carrying the resolved session id
    Registered { id: SessionId },
    /// Full game snapshot
    GameSnapshot(Game),
    /// Relay of a blobs update from `source`
    BlobsRelay { data: Value, source: SessionId },
}
