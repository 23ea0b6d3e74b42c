//! Infrastructure layer: in-memory stores, WebSocket delivery and the wire
//! format.

pub mod dto;
pub mod message_pusher;
pub mod repository;
