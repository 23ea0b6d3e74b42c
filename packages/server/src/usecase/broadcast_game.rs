//! Broadcast Fan-out
//!
//! Delivers a payload to every member of a game through the connection each
//! member is currently bound to. Delivery is best-effort: members without a
//! session, without a bound connection, or whose connection has since been
//! re-homed to another session are skipped without error.

use std::sync::Arc;

use crate::domain::{
    ConnectionId, ConnectionRegistry, Game, MessagePusher, OutboundMessage, SessionRepository,
};

/// ゲーム単位のブロードキャスト
pub struct GameBroadcaster {
    sessions: Arc<dyn SessionRepository>,
    connections: Arc<dyn ConnectionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl GameBroadcaster {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        connections: Arc<dyn ConnectionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            sessions,
            connections,
            message_pusher,
        }
    }

    /// Send `message` to every reachable member of `game`.
    ///
    /// # Returns
    ///
    /// The connections the message was handed to
    pub async fn broadcast(&self, game: &Game, message: &OutboundMessage) -> Vec<ConnectionId> {
        let targets = self.resolve_targets(game).await;

        if let Err(e) = self
            .message_pusher
            .broadcast(targets.clone(), message)
            .await
        {
            tracing::warn!("Failed to broadcast to game '{}': {}", game.key, e);
        } else {
            tracing::debug!(
                "Broadcasted to {} connection(s) in game '{}'",
                targets.len(),
                game.key
            );
        }

        targets
    }

    /// Send the full snapshot of `game` to its members.
    pub async fn broadcast_snapshot(&self, game: &Game) -> Vec<ConnectionId> {
        self.broadcast(game, &OutboundMessage::GameSnapshot(game.clone()))
            .await
    }

    /// メンバーごとに現在バインドされている接続を解決する
    async fn resolve_targets(&self, game: &Game) -> Vec<ConnectionId> {
        let mut targets = Vec::with_capacity(game.members.len());

        for session_id in game.members.keys() {
            let Some(session) = self.sessions.find(session_id).await else {
                tracing::debug!("Skipping member '{}': session not found", session_id);
                continue;
            };
            let Some(connection_id) = session.connection_id else {
                tracing::debug!("Skipping member '{}': no bound connection", session_id);
                continue;
            };
            match self.connections.lookup(&connection_id).await {
                Some(bound) if &bound == session_id => targets.push(connection_id),
                _ => {
                    tracing::debug!(
                        "Skipping member '{}': connection '{}' is no longer bound to it",
                        session_id,
                        connection_id
                    );
                }
            }
        }

        targets
    }
}
