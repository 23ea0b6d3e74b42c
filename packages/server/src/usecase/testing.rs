//! ユースケースのテスト用フィクスチャ
//!
//! インメモリのリポジトリと WebSocket 用の MessagePusher を組み合わせ、
//! 接続ごとの受信チャネルを直接読めるようにします。

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, MessagePusher, SessionId},
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{
            InMemoryConnectionRegistry, InMemoryGameRepository, InMemorySessionRepository,
        },
    },
};
use cellrelay_shared::time::FixedClock;

use super::{
    DisconnectPolicy, GameBroadcaster, JoinGameUseCase, MessageRouter, RegisterSessionUseCase,
    UpdateGameUseCase,
};

pub const NOW: i64 = 1_700_000_000_000;

pub struct Fixture {
    pub sessions: Arc<InMemorySessionRepository>,
    pub connections: Arc<InMemoryConnectionRegistry>,
    pub games: Arc<InMemoryGameRepository>,
    pub pusher: Arc<WebSocketMessagePusher>,
    pub clock: Arc<FixedClock>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(InMemorySessionRepository::new()),
            connections: Arc::new(InMemoryConnectionRegistry::new()),
            games: Arc::new(InMemoryGameRepository::new()),
            pusher: Arc::new(WebSocketMessagePusher::new()),
            clock: Arc::new(FixedClock::new(NOW)),
        }
    }

    pub fn broadcaster(&self) -> Arc<GameBroadcaster> {
        Arc::new(GameBroadcaster::new(
            self.sessions.clone(),
            self.connections.clone(),
            self.pusher.clone(),
        ))
    }

    pub fn register_usecase(&self) -> RegisterSessionUseCase {
        RegisterSessionUseCase::new(
            self.sessions.clone(),
            self.connections.clone(),
            self.pusher.clone(),
            self.clock.clone(),
        )
    }

    pub fn join_usecase(&self) -> JoinGameUseCase {
        JoinGameUseCase::new(self.sessions.clone(), self.games.clone(), self.broadcaster())
    }

    pub fn update_usecase(&self) -> UpdateGameUseCase {
        UpdateGameUseCase::new(self.sessions.clone(), self.games.clone(), self.broadcaster())
    }

    pub fn router(&self, policy: DisconnectPolicy) -> MessageRouter {
        MessageRouter::new(
            self.connections.clone(),
            self.sessions.clone(),
            Arc::new(self.register_usecase()),
            Arc::new(self.join_usecase()),
            Arc::new(self.update_usecase()),
            self.clock.clone(),
            policy,
        )
    }

    /// 接続を開いて受信チャネルを返す（未登録のまま）
    pub async fn open_connection(
        &self,
        connection: &str,
    ) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
        let connection_id = ConnectionId::from(connection);
        let (tx, rx) = mpsc::unbounded_channel();
        self.pusher.register_client(connection_id.clone(), tx).await;
        (connection_id, rx)
    }

    /// 接続を開いてセッションに登録し、登録確認を読み捨てた受信チャネルを返す
    pub async fn register(&self, connection: &str, session: &str) -> mpsc::UnboundedReceiver<String> {
        let (connection_id, mut rx) = self.open_connection(connection).await;
        self.register_usecase()
            .execute(
                connection_id,
                Some(SessionId::from(session)),
                serde_json::json!({"type": "register", "id": session}),
            )
            .await;
        drain(&mut rx);
        rx
    }
}

/// 受信済みのメッセージをすべて JSON として取り出す
pub fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<Value> {
    let mut messages = Vec::new();
    while let Ok(text) = rx.try_recv() {
        messages.push(serde_json::from_str(&text).unwrap());
    }
    messages
}
