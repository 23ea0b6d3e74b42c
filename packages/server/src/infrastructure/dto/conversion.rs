//! Conversion logic between DTOs and domain entities.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::{
    Game, GameKey, InboundMessage, OutboundMessage, Session, SessionId, UpdateKind,
};
use crate::infrastructure::dto::{http, websocket as dto};
use cellrelay_shared::time::timestamp_to_rfc3339;

// ========================================
// Wire text → Domain
// ========================================

/// Decode a text frame into its raw JSON value and domain message.
///
/// Fails only when the text is not JSON at all; any JSON that does not match
/// a known message shape decodes as `InboundMessage::Unrecognized`.
pub fn decode_inbound(text: &str) -> Result<(Value, InboundMessage), serde_json::Error> {
    let raw: Value = serde_json::from_str(text)?;
    let message = inbound_from_value(&raw);
    Ok((raw, message))
}

/// Interpret a JSON value as an inbound message.
pub fn inbound_from_value(raw: &Value) -> InboundMessage {
    dto::InboundMessageDto::deserialize(raw)
        .map(InboundMessage::from)
        .unwrap_or(InboundMessage::Unrecognized)
}

impl From<dto::InboundMessageDto> for InboundMessage {
    fn from(dto: dto::InboundMessageDto) -> Self {
        match dto {
            dto::InboundMessageDto::Register { id } => Self::Register {
                id: id.and_then(dto::SessionIdDto::into_session_id),
            },
            dto::InboundMessageDto::Join {
                server_address,
                name,
                cells,
            } => Self::Join {
                game_key: GameKey::new(server_address),
                name,
                cells,
            },
            dto::InboundMessageDto::Update {
                update_type,
                update_data,
            } => Self::Update(match update_type.as_str() {
                "blobs" => UpdateKind::Blobs(update_data),
                "self" => UpdateKind::SelfState(update_data),
                _ => UpdateKind::Unrecognized(update_type),
            }),
            dto::InboundMessageDto::Unknown => Self::Unrecognized,
        }
    }
}

impl dto::SessionIdDto {
    /// An empty id counts as no id at all.
    fn into_session_id(self) -> Option<SessionId> {
        let id = match self {
            Self::Text(text) => text,
            Self::Number(number) => number.to_string(),
        };
        if id.is_empty() {
            None
        } else {
            Some(SessionId::new(id))
        }
    }
}

// ========================================
// Domain → Wire text
// ========================================

/// Encode an outbound message as a JSON text frame.
pub fn encode_outbound(message: &OutboundMessage) -> Result<String, serde_json::Error> {
    match message {
        OutboundMessage::Registered { id } => serde_json::to_string(&dto::RegisteredMessage {
            r#type: dto::MessageType::Register,
            id: id.as_str().to_string(),
        }),
        OutboundMessage::GameSnapshot(game) => serde_json::to_string(&dto::GameUpdateMessage {
            r#type: dto::MessageType::Update,
            update_type: dto::UpdateType::Game,
            update_data: game.into(),
        }),
        OutboundMessage::BlobsRelay { data, source } => {
            serde_json::to_string(&dto::BlobsUpdateMessage {
                r#type: dto::MessageType::Update,
                update_type: dto::UpdateType::Blobs,
                update_data: data.clone(),
                update_source: source.as_str().to_string(),
            })
        }
    }
}

impl From<&Game> for dto::GameSnapshotDto {
    fn from(game: &Game) -> Self {
        Self {
            server_address: game.key.as_str().to_string(),
            sessions: game
                .members
                .iter()
                .map(|(id, member)| (id.as_str().to_string(), member.to_value()))
                .collect(),
        }
    }
}

// ========================================
// Domain → HTTP DTO
// ========================================

impl From<&Game> for http::GameSummaryDto {
    fn from(game: &Game) -> Self {
        Self {
            server_address: game.key.as_str().to_string(),
            members: game
                .member_ids()
                .into_iter()
                .map(SessionId::into_string)
                .collect(),
        }
    }
}

impl From<&Session> for http::SessionSummaryDto {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id.as_str().to_string(),
            connection_id: session
                .connection_id
                .as_ref()
                .map(|id| id.as_str().to_string()),
            game: session
                .membership
                .as_ref()
                .map(|m| m.game_key.as_str().to_string()),
            name: session.membership.as_ref().map(|m| m.name.clone()),
            connected_at: timestamp_to_rfc3339(session.connected_at.value()),
            last_seen_at: timestamp_to_rfc3339(session.timestamp.value()),
        }
    }
}
