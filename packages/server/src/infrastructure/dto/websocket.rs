//! WebSocket message DTOs.
//!
//! Every message is a JSON object with a `type` discriminator. Field names
//! are camelCase on the wire.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inbound message as sent by clients
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InboundMessageDto {
    Register {
        #[serde(default)]
        id: Option<SessionIdDto>,
    },
    Join {
        #[serde(rename = "serverAddress")]
        server_address: String,
        #[serde(default)]
        name: Value,
        #[serde(default)]
        cells: Value,
    },
    Update {
        #[serde(rename = "updateType")]
        update_type: String,
        #[serde(rename = "updateData", default)]
        update_data: Value,
    },
    #[serde(other)]
    Unknown,
}

/// Session id chosen by a client; some clients send numbers
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SessionIdDto {
    Text(String),
    Number(serde_json::Number),
}

/// Outbound message type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Register,
    Update,
}

/// Outbound update sub-type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateType {
    Game,
    Blobs,
}

/// Registration acknowledgement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisteredMessage {
    pub r#type: MessageType,
    pub id: String,
}

/// Full game snapshot broadcast
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameUpdateMessage {
    pub r#type: MessageType,
    pub update_type: UpdateType,
    pub update_data: GameSnapshotDto,
}

/// Relay of a blobs update
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobsUpdateMessage {
    pub r#type: MessageType,
    pub update_type: UpdateType,
    pub update_data: Value,
    pub update_source: String,
}

/// Wire form of a game: its address and member projections keyed by session id
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshotDto {
    pub server_address: String,
    pub sessions: BTreeMap<String, Value>,
}
