//! UI 層（axum による WebSocket / HTTP の入口）

mod dispatcher;
mod handler;
mod server;
mod signal;
pub mod state;

pub use dispatcher::{InboundEvent, spawn_dispatcher};
pub use server::Server;
