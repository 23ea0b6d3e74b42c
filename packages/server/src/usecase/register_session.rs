//! UseCase: セッション登録処理
//!
//! 接続をセッションにバインドします。同じセッション ID での再登録は
//! 再接続として扱われ、セッションは新しい接続へ付け替えられます。
//! 以前の接続は Connection Registry から外されるだけで、閉じられはしません。

use std::sync::Arc;

use serde_json::Value;

use crate::domain::{
    ConnectionId, ConnectionRegistry, MessagePusher, OutboundMessage, Session, SessionId,
    SessionRepository, Timestamp,
};
use cellrelay_shared::time::Clock;

/// セッション登録のユースケース
pub struct RegisterSessionUseCase {
    sessions: Arc<dyn SessionRepository>,
    connections: Arc<dyn ConnectionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl RegisterSessionUseCase {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        connections: Arc<dyn ConnectionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sessions,
            connections,
            message_pusher,
            clock,
        }
    }

    /// セッション登録を実行
    ///
    /// Registration always succeeds. A failure to deliver the
    /// acknowledgement is logged and does not undo the binding.
    ///
    /// # Arguments
    ///
    /// * `connection_id` - 登録する接続
    /// * `requested_id` - クライアントが指定したセッション ID（`None` なら接続 ID を使う）
    /// * `payload` - 受信した register メッセージ（診断用に保存）
    ///
    /// # Returns
    ///
    /// 登録後の Session
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        requested_id: Option<SessionId>,
        payload: Value,
    ) -> Session {
        let now = Timestamp::new(self.clock.now_millis());

        // 1. セッション ID の決定
        let session_id = requested_id.unwrap_or_else(|| SessionId::from_connection(&connection_id));

        // 2. 既存セッションの取得または作成
        let mut session = match self.sessions.find(&session_id).await {
            Some(session) => session,
            None => {
                tracing::info!("Session '{}' created", session_id);
                Session::new(session_id.clone(), now)
            }
        };

        // 3. 以前の接続のバインドを解除
        if let Some(previous) = session.bind_connection(connection_id.clone(), payload, now) {
            self.connections.unbind(&previous).await;
            tracing::info!(
                "Session '{}' moved from connection '{}' to '{}'",
                session_id,
                previous,
                connection_id
            );
        }

        // 4. 新しい接続をバインド
        self.connections
            .bind(connection_id.clone(), session_id.clone())
            .await;
        self.sessions.save(session.clone()).await;

        // 5. 登録確認を送信
        let ack = OutboundMessage::Registered {
            id: session_id.clone(),
        };
        if let Err(e) = self.message_pusher.push_to(&connection_id, &ack).await {
            tracing::warn!(
                "Failed to acknowledge registration of '{}' on '{}': {}",
                session_id,
                connection_id,
                e
            );
        }

        tracing::info!(
            "Connection '{}' registered to session '{}'",
            connection_id,
            session_id
        );

        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{GameKey, message_pusher::MockMessagePusher},
        infrastructure::repository::{InMemoryConnectionRegistry, InMemorySessionRepository},
        usecase::testing::{Fixture, NOW, drain},
    };
    use cellrelay_shared::time::FixedClock;
    use serde_json::json;

    #[tokio::test]
    async fn test_register_with_requested_id() {
        // テスト項目: 指定した ID でセッションが作成され、接続がバインドされる
        // given (前提条件):
        let fixture = Fixture::new();
        let (connection_id, mut rx) = fixture.open_connection("c1").await;
        let usecase = fixture.register_usecase();
        let payload = json!({"type": "register", "id": "alice"});

        // when (操作):
        let session = usecase
            .execute(
                connection_id.clone(),
                Some(SessionId::from("alice")),
                payload.clone(),
            )
            .await;

        // then (期待する結果):
        assert_eq!(session.id, SessionId::from("alice"));
        assert_eq!(session.connection_id, Some(connection_id.clone()));
        assert_eq!(session.last_message, payload);
        assert_eq!(session.connected_at, Timestamp::new(NOW));
        assert_eq!(
            fixture.connections.lookup(&connection_id).await,
            Some(SessionId::from("alice"))
        );
        assert_eq!(
            fixture.sessions.find(&SessionId::from("alice")).await,
            Some(session)
        );
        assert_eq!(drain(&mut rx), vec![json!({"type": "register", "id": "alice"})]);
    }

    #[tokio::test]
    async fn test_register_without_id_uses_connection_id() {
        // テスト項目: ID を指定しない登録では接続 ID がセッション ID になる
        // given (前提条件):
        let fixture = Fixture::new();
        let (connection_id, mut rx) = fixture.open_connection("spark-7").await;
        let usecase = fixture.register_usecase();

        // when (操作):
        let session = usecase
            .execute(connection_id, None, json!({"type": "register"}))
            .await;

        // then (期待する結果):
        assert_eq!(session.id, SessionId::from("spark-7"));
        assert_eq!(drain(&mut rx), vec![json!({"type": "register", "id": "spark-7"})]);
    }

    #[tokio::test]
    async fn test_reregister_moves_session_to_new_connection() {
        // テスト項目: 同じセッション ID で再登録すると新しい接続に付け替えられ、古い接続は外れる
        // given (前提条件):
        let fixture = Fixture::new();
        let _old_rx = fixture.register("A", "S").await;
        let (new_connection, mut new_rx) = fixture.open_connection("B").await;
        let usecase = fixture.register_usecase();

        // when (操作):
        let session = usecase
            .execute(new_connection.clone(), Some(SessionId::from("S")), json!({}))
            .await;

        // then (期待する結果):
        assert_eq!(session.connection_id, Some(new_connection.clone()));
        assert_eq!(fixture.connections.lookup(&ConnectionId::from("A")).await, None);
        assert_eq!(
            fixture.connections.lookup(&new_connection).await,
            Some(SessionId::from("S"))
        );
        assert_eq!(fixture.connections.count().await, 1);
        assert_eq!(drain(&mut new_rx).len(), 1);
    }

    #[tokio::test]
    async fn test_reregister_keeps_membership() {
        // テスト項目: 再接続してもゲームへの所属は維持される
        // given (前提条件):
        let fixture = Fixture::new();
        let _old_rx = fixture.register("A", "S").await;
        fixture
            .join_usecase()
            .execute(
                &SessionId::from("S"),
                GameKey::from("g1"),
                json!("s"),
                json!([]),
            )
            .await
            .unwrap();
        let (new_connection, _new_rx) = fixture.open_connection("B").await;

        // when (操作):
        let session = fixture
            .register_usecase()
            .execute(new_connection, Some(SessionId::from("S")), json!({}))
            .await;

        // then (期待する結果):
        assert_eq!(session.game_key(), Some(&GameKey::from("g1")));
    }

    #[tokio::test]
    async fn test_register_succeeds_when_ack_cannot_be_delivered() {
        // テスト項目: 登録確認を送れなくても登録自体は成功する
        // given (前提条件):
        let sessions = Arc::new(InMemorySessionRepository::new());
        let connections = Arc::new(InMemoryConnectionRegistry::new());
        let mut pusher = MockMessagePusher::new();
        pusher.expect_push_to().times(1).returning(|connection_id, _| {
            Err(crate::domain::MessagePushError::ConnectionNotFound(
                connection_id.as_str().to_string(),
            ))
        });
        let usecase = RegisterSessionUseCase::new(
            sessions.clone(),
            connections.clone(),
            Arc::new(pusher),
            Arc::new(FixedClock::new(NOW)),
        );

        // when (操作):
        let session = usecase
            .execute(ConnectionId::from("gone"), Some(SessionId::from("alice")), json!({}))
            .await;

        // then (期待する結果):
        assert_eq!(session.connection_id, Some(ConnectionId::from("gone")));
        assert_eq!(
            connections.lookup(&ConnectionId::from("gone")).await,
            Some(SessionId::from("alice"))
        );
    }
}
