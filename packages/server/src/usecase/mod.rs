//! UseCase 層
//!
//! リレーの振る舞い（登録・参加・更新・ブロードキャスト）と、それらを
//! メッセージ種別ごとに振り分ける `MessageRouter` を提供します。

mod broadcast_game;
mod error;
mod get_games;
mod get_sessions;
mod join_game;
mod prune_games;
mod register_session;
mod route_message;
mod update_game;

#[cfg(test)]
pub(crate) mod testing;

pub use broadcast_game::GameBroadcaster;
pub use error::{GetGameDetailError, JoinGameError, UpdateError};
pub use get_games::{GetGameDetailUseCase, GetGamesUseCase};
pub use get_sessions::GetSessionsUseCase;
pub use join_game::JoinGameUseCase;
pub use prune_games::PruneGamesUseCase;
pub use register_session::RegisterSessionUseCase;
pub use route_message::{DisconnectPolicy, MessageRouter, RouteOutcome};
pub use update_game::UpdateGameUseCase;
