//! UseCase: ゲーム参加処理
//!
//! セッションを指定したゲームへ参加（または移動）させ、更新後のゲーム全体を
//! メンバー全員にブロードキャストします。既に参加しているゲームへの join も
//! 通常の上書きとして扱い、必ず再ブロードキャストします。

use std::sync::Arc;

use serde_json::Value;

use crate::domain::{Game, GameKey, GameRepository, GameSession, SessionId, SessionRepository};

use super::{broadcast_game::GameBroadcaster, error::JoinGameError};

/// ゲーム参加のユースケース
pub struct JoinGameUseCase {
    sessions: Arc<dyn SessionRepository>,
    games: Arc<dyn GameRepository>,
    broadcaster: Arc<GameBroadcaster>,
}

impl JoinGameUseCase {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        games: Arc<dyn GameRepository>,
        broadcaster: Arc<GameBroadcaster>,
    ) -> Self {
        Self {
            sessions,
            games,
            broadcaster,
        }
    }

    /// ゲーム参加を実行
    ///
    /// # Arguments
    ///
    /// * `session_id` - 参加するセッション
    /// * `game_key` - 参加先ゲームのアドレス
    /// * `name` - ゲーム内での表示名（内容は解釈しない）
    /// * `cells` - ゲーム内のエンティティ表現（内容は解釈しない）
    ///
    /// # Returns
    ///
    /// * `Ok(Game)` - 参加後のゲーム
    /// * `Err(JoinGameError)` - セッションが存在しない
    pub async fn execute(
        &self,
        session_id: &SessionId,
        game_key: GameKey,
        name: Value,
        cells: Value,
    ) -> Result<Game, JoinGameError> {
        let mut session = self
            .sessions
            .find(session_id)
            .await
            .ok_or_else(|| JoinGameError::SessionNotFound(session_id.as_str().to_string()))?;

        // 1. 別のゲームに所属していれば、そのゲームから抜ける（ゲーム自体は残す）
        if let Some(previous) = session.game_key().filter(|key| **key != game_key) {
            match self.games.remove_member(previous, session_id).await {
                Ok(_) => tracing::info!("Session '{}' left game '{}'", session_id, previous),
                Err(e) => tracing::debug!("Previous game of '{}' is gone: {}", session_id, e),
            }
        }

        // 2. ゲームの取得または作成
        let mut game = self.games.find_or_create(&game_key).await;

        // 3. セッションの所属を更新
        let member = GameSession::joined(session_id, name.clone(), cells);
        session.join(game_key.clone(), name);
        self.sessions.save(session).await;

        // 4. ゲームのメンバー一覧を更新
        game.upsert_member(session_id.clone(), member);
        self.games.save(game.clone()).await;
        tracing::info!("Session '{}' joined game '{}'", session_id, game_key);

        // 5. ゲーム全体をブロードキャスト
        self.broadcaster.broadcast_snapshot(&game).await;

        Ok(game)
    }
}
