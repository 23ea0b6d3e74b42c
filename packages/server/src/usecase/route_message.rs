//! Message Router
//!
//! Dispatches one inbound message according to the sending connection's
//! registration state:
//!
//! ```text
//! Unregistered --register--> Registered
//!      |                         |
//!      +-- anything else:        +-- join          -> JoinGameUseCase
//!          dropped                +-- update/blobs  -> UpdateGameUseCase::relay_blobs
//!                                 +-- update/self   -> UpdateGameUseCase::update_self
//!                                 +-- anything else -> ignored
//! ```
//!
//! Every message from a registered connection is recorded on its session
//! before dispatch. Nothing here ever fails: every problem degrades to a log
//! line and the next message is processed normally.

use std::sync::Arc;

use serde_json::Value;

use crate::domain::{
    ConnectionId, ConnectionRegistry, InboundMessage, SessionId, SessionRepository, Timestamp,
    UpdateKind,
};
use cellrelay_shared::time::Clock;

use super::{
    error::UpdateError, join_game::JoinGameUseCase, register_session::RegisterSessionUseCase,
    update_game::UpdateGameUseCase,
};

/// What the router does when the transport reports a closed connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisconnectPolicy {
    /// Keep the binding until the session registers again elsewhere
    #[default]
    Retain,
    /// Unbind the connection and clear the session's connection
    Unbind,
}

/// Result of routing a single message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// The connection is now bound to this session
    Registered(SessionId),
    /// Handed to a join or update use case
    Dispatched,
    /// Recorded on the session but otherwise ignored
    Ignored,
    /// Discarded without touching any state
    Dropped,
}

/// メッセージの振り分けを行うユースケース
pub struct MessageRouter {
    connections: Arc<dyn ConnectionRegistry>,
    sessions: Arc<dyn SessionRepository>,
    register_session_usecase: Arc<RegisterSessionUseCase>,
    join_game_usecase: Arc<JoinGameUseCase>,
    update_game_usecase: Arc<UpdateGameUseCase>,
    clock: Arc<dyn Clock>,
    disconnect_policy: DisconnectPolicy,
}

impl MessageRouter {
    pub fn new(
        connections: Arc<dyn ConnectionRegistry>,
        sessions: Arc<dyn SessionRepository>,
        register_session_usecase: Arc<RegisterSessionUseCase>,
        join_game_usecase: Arc<JoinGameUseCase>,
        update_game_usecase: Arc<UpdateGameUseCase>,
        clock: Arc<dyn Clock>,
        disconnect_policy: DisconnectPolicy,
    ) -> Self {
        Self {
            connections,
            sessions,
            register_session_usecase,
            join_game_usecase,
            update_game_usecase,
            clock,
            disconnect_policy,
        }
    }

    /// Route one inbound message.
    ///
    /// # Arguments
    ///
    /// * `connection_id` - 送信元の接続
    /// * `raw` - 受信した JSON（セッションに記録される）
    /// * `message` - `raw` を解釈したメッセージ
    pub async fn route(
        &self,
        connection_id: &ConnectionId,
        raw: Value,
        message: InboundMessage,
    ) -> RouteOutcome {
        let Some(session_id) = self.connections.lookup(connection_id).await else {
            return self.route_unregistered(connection_id, raw, message).await;
        };

        let Some(mut session) = self.sessions.find(&session_id).await else {
            tracing::warn!(
                "Connection '{}' is bound to missing session '{}'",
                connection_id,
                session_id
            );
            return RouteOutcome::Dropped;
        };

        // 種別に関わらず最後のメッセージを記録
        session.record_message(raw, Timestamp::new(self.clock.now_millis()));
        self.sessions.save(session).await;

        let kind = message.kind();
        tracing::debug!(
            "Routing '{}' from session '{}' on '{}'",
            kind,
            session_id,
            connection_id
        );

        match message {
            InboundMessage::Join {
                game_key,
                name,
                cells,
            } => match self
                .join_game_usecase
                .execute(&session_id, game_key, name, cells)
                .await
            {
                Ok(_) => RouteOutcome::Dispatched,
                Err(e) => {
                    tracing::debug!("Ignoring join: {}", e);
                    RouteOutcome::Ignored
                }
            },
            InboundMessage::Update(UpdateKind::Blobs(data)) => {
                let result = self
                    .update_game_usecase
                    .relay_blobs(&session_id, data)
                    .await
                    .map(|_| ());
                Self::update_outcome(result)
            }
            InboundMessage::Update(UpdateKind::SelfState(data)) => {
                let result = self
                    .update_game_usecase
                    .update_self(&session_id, data)
                    .await
                    .map(|_| ());
                Self::update_outcome(result)
            }
            InboundMessage::Update(UpdateKind::Unrecognized(update_type)) => {
                tracing::debug!(
                    "Ignoring update type '{}' from session '{}'",
                    update_type,
                    session_id
                );
                RouteOutcome::Ignored
            }
            InboundMessage::Register { .. } | InboundMessage::Unrecognized => {
                tracing::debug!(
                    "Ignoring '{}' from registered session '{}'",
                    kind,
                    session_id
                );
                RouteOutcome::Ignored
            }
        }
    }

    /// Handle the transport's notification that a connection closed.
    ///
    /// # Returns
    ///
    /// `true` when a binding was removed
    pub async fn disconnect(&self, connection_id: &ConnectionId) -> bool {
        match self.disconnect_policy {
            DisconnectPolicy::Retain => {
                tracing::debug!(
                    "Connection '{}' closed; binding retained until re-registration",
                    connection_id
                );
                false
            }
            DisconnectPolicy::Unbind => {
                let Some(session_id) = self.connections.lookup(connection_id).await else {
                    return false;
                };
                self.connections.unbind(connection_id).await;
                if let Some(mut session) = self.sessions.find(&session_id).await {
                    if session.release_connection(connection_id) {
                        self.sessions.save(session).await;
                    }
                }
                tracing::info!(
                    "Connection '{}' closed; unbound from session '{}'",
                    connection_id,
                    session_id
                );
                true
            }
        }
    }

    async fn route_unregistered(
        &self,
        connection_id: &ConnectionId,
        raw: Value,
        message: InboundMessage,
    ) -> RouteOutcome {
        match message {
            InboundMessage::Register { id } => {
                let session = self
                    .register_session_usecase
                    .execute(connection_id.clone(), id, raw)
                    .await;
                RouteOutcome::Registered(session.id)
            }
            other => {
                tracing::warn!(
                    "Dropping '{}' from unregistered connection '{}': {}",
                    other.kind(),
                    connection_id,
                    raw
                );
                RouteOutcome::Dropped
            }
        }
    }

    fn update_outcome(result: Result<(), UpdateError>) -> RouteOutcome {
        match result {
            Ok(()) => RouteOutcome::Dispatched,
            Err(e @ UpdateError::InvalidSelfState(_)) => {
                tracing::warn!("Dropping update: {}", e);
                RouteOutcome::Ignored
            }
            Err(e) => {
                tracing::debug!("Ignoring update: {}", e);
                RouteOutcome::Ignored
            }
        }
    }
}
