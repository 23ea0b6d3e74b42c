//! Repository 実装
//!
//! - `inmemory`: HashMap を使ったインメモリ実装（プロセス終了で消える）

pub mod inmemory;

pub use inmemory::{InMemoryConnectionRegistry, InMemoryGameRepository, InMemorySessionRepository};
