//! InMemory Repository 実装

mod connection;
mod game;
mod session;

pub use connection::InMemoryConnectionRegistry;
pub use game::InMemoryGameRepository;
pub use session::InMemorySessionRepository;
