//! InMemory Game Repository 実装
//!
//! Game はメンバーが 0 人になっても削除されません。削除は
//! `remove_empty` を明示的に呼んだときだけ行われます。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Game, GameKey, GameRepository, RepositoryError, SessionId};

/// インメモリ Game Repository 実装
#[derive(Default)]
pub struct InMemoryGameRepository {
    games: Mutex<HashMap<GameKey, Game>>,
}

impl InMemoryGameRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GameRepository for InMemoryGameRepository {
    async fn find(&self, key: &GameKey) -> Option<Game> {
        let games = self.games.lock().await;
        games.get(key).cloned()
    }

    async fn find_or_create(&self, key: &GameKey) -> Game {
        let mut games = self.games.lock().await;
        games
            .entry(key.clone())
            .or_insert_with(|| {
                tracing::info!("Game '{}' created", key);
                Game::new(key.clone())
            })
            .clone()
    }

    async fn save(&self, game: Game) {
        let mut games = self.games.lock().await;
        games.insert(game.key.clone(), game);
    }

    async fn remove_member(
        &self,
        key: &GameKey,
        session_id: &SessionId,
    ) -> Result<Game, RepositoryError> {
        let mut games = self.games.lock().await;
        let game = games
            .get_mut(key)
            .ok_or_else(|| RepositoryError::GameNotFound(key.as_str().to_string()))?;
        game.remove_member(session_id);
        Ok(game.clone())
    }

    async fn list(&self) -> Vec<Game> {
        let games = self.games.lock().await;
        games.values().cloned().collect()
    }

    async fn remove_empty(&self) -> Vec<GameKey> {
        let mut games = self.games.lock().await;
        let mut removed: Vec<GameKey> = games
            .values()
            .filter(|game| game.is_empty())
            .map(|game| game.key.clone())
            .collect();
        for key in &removed {
            games.remove(key);
        }
        removed.sort();
        removed
    }
}
