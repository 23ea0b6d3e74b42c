//! Single-threaded message dispatch.
//!
//! Every connection's reader forwards its frames into one channel, and one
//! task drains it, so the router sees messages one at a time in arrival
//! order and each message's state changes and broadcasts complete before
//! the next message starts. Pruning empty games is queued the same way so it
//! never interleaves with a join.

use std::sync::Arc;

use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use crate::{
    domain::{ConnectionId, GameKey},
    infrastructure::dto::conversion::decode_inbound,
    usecase::{MessageRouter, PruneGamesUseCase},
};

/// Event processed by the dispatcher
#[derive(Debug)]
pub enum InboundEvent {
    /// テキストフレームを受信した
    Message {
        connection_id: ConnectionId,
        text: String,
    },
    /// 接続が閉じられた
    Disconnected { connection_id: ConnectionId },
    /// 空のゲームを削除し、削除したアドレスを返す
    PruneGames { reply: oneshot::Sender<Vec<GameKey>> },
}

/// Spawn the dispatcher task.
///
/// The task ends once every sender of the returned channel is dropped.
pub fn spawn_dispatcher(
    router: Arc<MessageRouter>,
    prune_games_usecase: Arc<PruneGamesUseCase>,
) -> (mpsc::UnboundedSender<InboundEvent>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            handle_event(&router, &prune_games_usecase, event).await;
        }
        tracing::debug!("Dispatcher stopped");
    });
    (tx, handle)
}

async fn handle_event(
    router: &MessageRouter,
    prune_games_usecase: &PruneGamesUseCase,
    event: InboundEvent,
) {
    match event {
        InboundEvent::Message {
            connection_id,
            text,
        } => match decode_inbound(&text) {
            Ok((raw, message)) => {
                let outcome = router.route(&connection_id, raw, message).await;
                tracing::debug!("Message from '{}' routed: {:?}", connection_id, outcome);
            }
            Err(e) => {
                tracing::warn!(
                    "Dropping malformed message from '{}': {}",
                    connection_id,
                    e
                );
            }
        },
        InboundEvent::Disconnected { connection_id } => {
            router.disconnect(&connection_id).await;
        }
        InboundEvent::PruneGames { reply } => {
            let removed = prune_games_usecase.execute().await;
            if reply.send(removed).is_err() {
                tracing::debug!("Prune requester went away before the result was ready");
            }
        }
    }
}
