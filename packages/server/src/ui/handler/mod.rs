//! Request handlers.

mod http;
mod websocket;

pub use http::{get_game_detail, get_games, get_sessions, health_check, prune_games};
pub use websocket::websocket_handler;
