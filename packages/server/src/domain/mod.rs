//! Domain layer: relay entities, value objects, protocol messages and the
//! interfaces the use cases depend on.

pub mod entity;
pub mod error;
pub mod message;
pub mod message_pusher;
pub mod repository;
pub mod value_object;

pub use entity::{Game, GameSession, Membership, Session};
pub use error::{MessagePushError, RepositoryError};
pub use message::{InboundMessage, OutboundMessage, UpdateKind};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use repository::{ConnectionRegistry, GameRepository, SessionRepository};
pub use value_object::{ConnectionId, ConnectionIdFactory, GameKey, SessionId, Timestamp};
