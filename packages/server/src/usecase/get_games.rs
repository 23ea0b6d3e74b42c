//! UseCase: ゲーム情報の取得
//!
//! HTTP API から参照されるだけで、ゲームの状態は変更しません。

use std::sync::Arc;

use crate::domain::{Game, GameKey, GameRepository};

use super::error::GetGameDetailError;

/// ゲーム一覧取得のユースケース
pub struct GetGamesUseCase {
    games: Arc<dyn GameRepository>,
}

impl GetGamesUseCase {
    pub fn new(games: Arc<dyn GameRepository>) -> Self {
        Self { games }
    }

    /// 全ゲームをアドレス順に返す
    pub async fn execute(&self) -> Vec<Game> {
        let mut games = self.games.list().await;
        games.sort_by(|a, b| a.key.cmp(&b.key));
        games
    }
}

/// ゲーム詳細取得のユースケース
pub struct GetGameDetailUseCase {
    games: Arc<dyn GameRepository>,
}

impl GetGameDetailUseCase {
    pub fn new(games: Arc<dyn GameRepository>) -> Self {
        Self { games }
    }

    /// # Returns
    ///
    /// * `Ok(Game)` - 指定したアドレスのゲーム
    /// * `Err(GetGameDetailError::GameNotFound)` - ゲームが存在しない
    pub async fn execute(&self, game_key: String) -> Result<Game, GetGameDetailError> {
        let key = GameKey::new(game_key);
        self.games
            .find(&key)
            .await
            .ok_or_else(|| GetGameDetailError::GameNotFound(key.into_string()))
    }
}
