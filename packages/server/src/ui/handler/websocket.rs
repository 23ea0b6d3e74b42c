//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, ConnectionIdFactory},
    ui::{dispatcher::InboundEvent, state::AppState},
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// This function handles the outbound message flow: acknowledgements and
/// broadcasts (via rx channel) are written to this connection in the order
/// they were pushed.
///
/// # Arguments
///
/// * `rx` - Channel receiver fed by the MessagePusher
/// * `sender` - WebSocket sink of this connection
///
/// # Returns
///
/// A `JoinHandle` for the spawned task
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id = ConnectionIdFactory::generate();
    let (sender, mut receiver) = socket.split();

    // Create a channel for this connection to receive messages
    let (tx, rx) = mpsc::unbounded_channel();
    state
        .message_pusher
        .register_client(connection_id.clone(), tx)
        .await;
    tracing::info!("Connection '{}' opened", connection_id);

    let recv_connection_id = connection_id.clone();
    let dispatcher = state.dispatcher.clone();

    // Spawn a task to forward frames from this connection to the dispatcher
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on '{}': {}", recv_connection_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    tracing::trace!(
                        "Received text from '{}': {}",
                        recv_connection_id,
                        text.as_str()
                    );
                    let event = InboundEvent::Message {
                        connection_id: recv_connection_id.clone(),
                        text: text.as_str().to_string(),
                    };
                    if dispatcher.send(event).is_err() {
                        tracing::error!("Dispatcher is gone; closing '{}'", recv_connection_id);
                        break;
                    }
                }
                Message::Binary(_) => {
                    tracing::debug!("Ignoring binary frame from '{}'", recv_connection_id);
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", recv_connection_id);
                    break;
                }
                // Ping/pong is handled automatically by the WebSocket protocol
                _ => {}
            }
        }
    });

    // Spawn a task to write pushed messages to this connection
    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    close_connection(&state, connection_id).await;
}

async fn close_connection(state: &AppState, connection_id: ConnectionId) {
    state.message_pusher.unregister_client(&connection_id).await;
    if state
        .dispatcher
        .send(InboundEvent::Disconnected {
            connection_id: connection_id.clone(),
        })
        .is_err()
    {
        tracing::warn!("Dispatcher is gone; disconnect of '{}' not recorded", connection_id);
    }
    tracing::info!("Connection '{}' closed", connection_id);
}
