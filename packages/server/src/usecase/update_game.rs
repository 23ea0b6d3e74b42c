//! UseCase: ゲーム内の状態更新
//!
//! - `relay_blobs`: 位置情報などの一時的な更新を、送信元を付けてゲーム全体に中継する
//!   （ゲームの状態は変更しない）
//! - `update_self`: 送信元セッションのゲーム内表現を受信した状態で丸ごと置き換え、
//!   ゲーム全体をブロードキャストする

use std::sync::Arc;

use serde_json::Value;

use crate::domain::{
    ConnectionId, Game, GameRepository, GameSession, OutboundMessage, SessionId,
    SessionRepository,
};

use super::{broadcast_game::GameBroadcaster, error::UpdateError};

/// ゲーム内状態更新のユースケース
pub struct UpdateGameUseCase {
    sessions: Arc<dyn SessionRepository>,
    games: Arc<dyn GameRepository>,
    broadcaster: Arc<GameBroadcaster>,
}

impl UpdateGameUseCase {
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

    /// blobs 更新を中継
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ConnectionId>)` - 中継先の接続
    /// * `Err(UpdateError)` - セッションまたはゲームが見つからない
    pub async fn relay_blobs(
        &self,
        session_id: &SessionId,
        data: Value,
    ) -> Result<Vec<ConnectionId>, UpdateError> {
        let game = self.current_game(session_id).await?;
        let message = OutboundMessage::BlobsRelay {
            data,
            source: session_id.clone(),
        };
        Ok(self.broadcaster.broadcast(&game, &message).await)
    }

    /// self 更新を反映してブロードキャスト
    ///
    /// The member entry is replaced, not merged: only `id` is kept from the
    /// relay's side.
    ///
    /// # Returns
    ///
    /// * `Ok(Game)` - 更新後のゲーム
    /// * `Err(UpdateError)` - ペイロードがオブジェクトでない、またはセッション・ゲームが見つからない
    pub async fn update_self(
        &self,
        session_id: &SessionId,
        data: Value,
    ) -> Result<Game, UpdateError> {
        let Value::Object(state) = data else {
            return Err(UpdateError::InvalidSelfState(
                session_id.as_str().to_string(),
            ));
        };

        let mut game = self.current_game(session_id).await?;
        game.upsert_member(session_id.clone(), GameSession::snapshot(session_id, state));
        self.games.save(game.clone()).await;
        tracing::debug!(
            "Session '{}' updated its state in game '{}'",
            session_id,
            game.key
        );

        self.broadcaster.broadcast_snapshot(&game).await;

        Ok(game)
    }

    /// セッションが現在所属しているゲームを取得
    async fn current_game(&self, session_id: &SessionId) -> Result<Game, UpdateError> {
        let session = self
            .sessions
            .find(session_id)
            .await
            .ok_or_else(|| UpdateError::SessionNotFound(session_id.as_str().to_string()))?;
        let game_key = session
            .game_key()
            .ok_or_else(|| UpdateError::NotInGame(session_id.as_str().to_string()))?;
        self.games
            .find(game_key)
            .await
            .ok_or_else(|| UpdateError::GameNotFound(game_key.as_str().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::GameKey,
        usecase::testing::{Fixture, drain},
    };
    use serde_json::json;

    async fn join(fixture: &Fixture, session: &str, key: &str) {
        fixture
            .join_usecase()
            .execute(
                &SessionId::from(session),
                GameKey::from(key),
                json!(session),
                json!([{"x": 0}]),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_relay_blobs_reaches_every_member_with_source() {
        // テスト項目: blobs 更新が送信元付きでゲームの全メンバー（送信者を含む）に中継される
        // given (前提条件):
        let fixture = Fixture::new();
        let mut alice_rx = fixture.register("c1", "alice").await;
        let mut bob_rx = fixture.register("c2", "bob").await;
        join(&fixture, "alice", "g1").await;
        join(&fixture, "bob", "g1").await;
        drain(&mut alice_rx);
        drain(&mut bob_rx);
        let usecase = fixture.update_usecase();

        // when (操作):
        let delivered = usecase
            .relay_blobs(&SessionId::from("alice"), json!([{"x": 10, "y": 20}]))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(delivered.len(), 2);
        let expected = json!({
            "type": "update",
            "updateType": "blobs",
            "updateData": [{"x": 10, "y": 20}],
            "updateSource": "alice"
        });
        assert_eq!(drain(&mut alice_rx), vec![expected.clone()]);
        assert_eq!(drain(&mut bob_rx), vec![expected]);
    }

    #[tokio::test]
    async fn test_relay_blobs_does_not_touch_game_state() {
        // テスト項目: blobs 更新はゲームのメンバー情報を変更しない
        // given (前提条件):
        let fixture = Fixture::new();
        let _rx = fixture.register("c1", "alice").await;
        join(&fixture, "alice", "g1").await;
        let before = fixture.games.find(&GameKey::from("g1")).await;

        // when (操作):
        fixture
            .update_usecase()
            .relay_blobs(&SessionId::from("alice"), json!({"x": 99}))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(fixture.games.find(&GameKey::from("g1")).await, before);
    }

    #[tokio::test]
    async fn test_relay_blobs_before_join() {
        // テスト項目: ゲームに参加していないセッションの blobs 更新は NotInGame になる
        // given (前提条件):
        let fixture = Fixture::new();
        let mut rx = fixture.register("c1", "alice").await;

        // when (操作):
        let result = fixture
            .update_usecase()
            .relay_blobs(&SessionId::from("alice"), json!([]))
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(UpdateError::NotInGame("alice".to_string())));
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_update_self_replaces_member_projection() {
        // テスト項目: self 更新はメンバー情報をマージせずに置き換え、id だけが付与される
        // given (前提条件):
        let fixture = Fixture::new();
        let mut rx = fixture.register("c1", "S").await;
        join(&fixture, "S", "G").await;
        drain(&mut rx);

        // when (操作):
        let game = fixture
            .update_usecase()
            .update_self(&SessionId::from("S"), json!({"hp": 10}))
            .await
            .unwrap();

        // then (期待する結果):
        let member = game.member(&SessionId::from("S")).unwrap();
        assert_eq!(member.to_value(), json!({"id": "S", "hp": 10}));
        let messages = drain(&mut rx);
        assert_eq!(messages.len(), 1);
        assert_eq!(
            messages[0]["updateData"]["sessions"]["S"],
            json!({"id": "S", "hp": 10})
        );
    }

    #[tokio::test]
    async fn test_update_self_keeps_session_membership_name() {
        // テスト項目: self 更新はセッション側の所属情報（name）を変更しない
        // given (前提条件):
        let fixture = Fixture::new();
        let _rx = fixture.register("c1", "S").await;
        join(&fixture, "S", "G").await;

        // when (操作):
        fixture
            .update_usecase()
            .update_self(&SessionId::from("S"), json!({"name": "renamed"}))
            .await
            .unwrap();

        // then (期待する結果):
        let session = fixture.sessions.find(&SessionId::from("S")).await.unwrap();
        assert_eq!(session.membership.unwrap().name, json!("S"));
    }

    #[tokio::test]
    async fn test_update_self_rejects_non_object_payload() {
        // テスト項目: オブジェクトでない self 更新は拒否され、ゲームは変わらない
        // given (前提条件):
        let fixture = Fixture::new();
        let _rx = fixture.register("c1", "S").await;
        join(&fixture, "S", "G").await;
        let before = fixture.games.find(&GameKey::from("G")).await;

        // when (操作):
        let result = fixture
            .update_usecase()
            .update_self(&SessionId::from("S"), json!(10))
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(UpdateError::InvalidSelfState("S".to_string())));
        assert_eq!(fixture.games.find(&GameKey::from("G")).await, before);
    }

    #[tokio::test]
    async fn test_update_self_for_unknown_session() {
        // テスト項目: 存在しないセッションの self 更新は SessionNotFound になる
        // given (前提条件):
        let fixture = Fixture::new();

        // when (操作):
        let result = fixture
            .update_usecase()
            .update_self(&SessionId::from("ghost"), json!({}))
            .await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(UpdateError::SessionNotFound("ghost".to_string()))
        );
    }
}
