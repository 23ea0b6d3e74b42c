//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの `UnboundedSender` を管理
//! - ドメインのメッセージを JSON テキストにエンコードして送信（push_to, broadcast）
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui::handler::websocket`）で行われます。
//! この実装は生成された `UnboundedSender` を受け取り、メッセージ送信に使用します。
//! 送信チャンネルの先では接続ごとの writer タスクが WebSocket へ書き込むため、
//! 送信処理がネットワークの応答を待つことはありません。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{ConnectionId, MessagePushError, MessagePusher, OutboundMessage, PusherChannel},
    infrastructure::dto::conversion::encode_outbound,
};

/// WebSocket を使った MessagePusher 実装
///
/// ## 使用例
///
/// ```ignore
/// let pusher = WebSocketMessagePusher::new();
/// pusher.register_client(connection_id.clone(), tx).await;
///
/// pusher
///     .push_to(&connection_id, &OutboundMessage::Registered { id: session_id })
///     .await?;
/// ```
#[derive(Default)]
pub struct WebSocketMessagePusher {
    /// 接続中のクライアントの送信チャンネル
    ///
    /// Key: connection id
    /// Value: PusherChannel
    clients: Mutex<HashMap<ConnectionId, PusherChannel>>,
}

impl WebSocketMessagePusher {
    /// 新しい WebSocketMessagePusher を作成
    pub fn new() -> Self {
        Self::default()
    }

    fn encode(message: &OutboundMessage) -> Result<String, MessagePushError> {
        encode_outbound(message).map_err(|e| MessagePushError::EncodeFailed(e.to_string()))
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        tracing::debug!("Connection '{}' registered to MessagePusher", connection_id);
        clients.insert(connection_id, sender);
    }

    async fn unregister_client(&self, connection_id: &ConnectionId) {
        let mut clients = self.clients.lock().await;
        clients.remove(connection_id);
        tracing::debug!(
            "Connection '{}' unregistered from MessagePusher",
            connection_id
        );
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        message: &OutboundMessage,
    ) -> Result<(), MessagePushError> {
        let content = Self::encode(message)?;
        let clients = self.clients.lock().await;

        if let Some(sender) = clients.get(connection_id) {
            sender
                .send(content)
                .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
            tracing::debug!("Pushed message to connection '{}'", connection_id);
            Ok(())
        } else {
            Err(MessagePushError::ConnectionNotFound(
                connection_id.as_str().to_string(),
            ))
        }
    }

    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        message: &OutboundMessage,
    ) -> Result<(), MessagePushError> {
        let content = Self::encode(message)?;
        let clients = self.clients.lock().await;

        for target in targets {
            if let Some(sender) = clients.get(&target) {
                // ブロードキャストでは一部の送信失敗を許容
                if let Err(e) = sender.send(content.clone()) {
                    tracing::warn!("Failed to push message to connection '{}': {}", target, e);
                } else {
                    tracing::debug!("Broadcasted message to connection '{}'", target);
                }
            } else {
                // 切断後もバインドが残った接続（DisconnectPolicy::Retain）
                tracing::debug!(
                    "Connection '{}' not found during broadcast, skipping",
                    target
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SessionId;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - WebSocketMessagePusher の基本的なメッセージ送信機能
    // - push_to: 特定の接続への送信
    // - broadcast: 複数接続への送信と受信者ごとの失敗の分離
    //
    // 【どのようなシナリオをテストするか】
    // 1. push_to の成功ケース（JSON にエンコードされて届く）
    // 2. push_to の失敗ケース（接続が存在しない）
    // 3. broadcast の成功ケース（複数接続）
    // 4. broadcast の部分失敗ケース（存在しない接続・閉じた接続が混在）
    // 5. 登録解除済みの接続への broadcast は警告ログを出さない
    // ========================================

    fn registered(id: &str) -> OutboundMessage {
        OutboundMessage::Registered {
            id: SessionId::from(id),
        }
    }

    fn parse(text: Option<String>) -> Value {
        serde_json::from_str(&text.expect("message should be delivered")).unwrap()
    }

    #[tokio::test]
    async fn test_push_to_success() {
        // テスト項目: 特定の接続にエンコード済みメッセージを送信できる
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let connection_id = ConnectionId::from("c1");
        pusher.register_client(connection_id.clone(), tx).await;

        // when (操作):
        let result = pusher.push_to(&connection_id, &registered("alice")).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(
            parse(rx.recv().await),
            json!({"type": "register", "id": "alice"})
        );
    }

    #[tokio::test]
    async fn test_push_to_connection_not_found() {
        // テスト項目: 存在しない接続への送信はエラーを返す
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();

        // when (操作):
        let result = pusher
            .push_to(&ConnectionId::from("nonexistent"), &registered("alice"))
            .await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(MessagePushError::ConnectionNotFound(
                "nonexistent".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_push_to_unregistered_connection() {
        // テスト項目: 登録解除した接続へは送信できない
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let connection_id = ConnectionId::from("c1");
        pusher.register_client(connection_id.clone(), tx).await;

        // when (操作):
        pusher.unregister_client(&connection_id).await;
        let result = pusher.push_to(&connection_id, &registered("alice")).await;

        // then (期待する結果):
        assert!(matches!(
            result,
            Err(MessagePushError::ConnectionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_broadcast_success() {
        // テスト項目: 複数の接続にメッセージをブロードキャストできる
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        pusher.register_client(ConnectionId::from("c1"), tx1).await;
        pusher.register_client(ConnectionId::from("c2"), tx2).await;
        let message = OutboundMessage::BlobsRelay {
            data: json!([1, 2, 3]),
            source: SessionId::from("alice"),
        };

        // when (操作):
        let targets = vec![ConnectionId::from("c1"), ConnectionId::from("c2")];
        let result = pusher.broadcast(targets, &message).await;

        // then (期待する結果):
        assert!(result.is_ok());
        let expected = json!({
            "type": "update",
            "updateType": "blobs",
            "updateData": [1, 2, 3],
            "updateSource": "alice"
        });
        assert_eq!(parse(rx1.recv().await), expected);
        assert_eq!(parse(rx2.recv().await), expected);
    }

    #[tokio::test]
    async fn test_broadcast_partial_failure() {
        // テスト項目: 存在しない接続や閉じた接続が混在しても他の接続には届く
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (closed_tx, closed_rx) = mpsc::unbounded_channel();
        let (tx, mut rx) = mpsc::unbounded_channel();
        pusher.register_client(ConnectionId::from("closed"), closed_tx).await;
        pusher.register_client(ConnectionId::from("alive"), tx).await;
        drop(closed_rx);

        // when (操作):
        let targets = vec![
            ConnectionId::from("closed"),
            ConnectionId::from("nonexistent"),
            ConnectionId::from("alive"),
        ];
        let result = pusher.broadcast(targets, &registered("alice")).await;

        // then (期待する結果):
        assert!(result.is_ok()); // ブロードキャストは部分失敗を許容
        assert_eq!(
            parse(rx.recv().await),
            json!({"type": "register", "id": "alice"})
        );
    }

    /// WARN 以上のログを書き込み先に溜める
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[tokio::test]
    async fn test_broadcast_to_stale_connection_does_not_warn() {
        // テスト項目: 既に閉じて登録解除された接続への配信は警告を出さずにスキップされる
        // given (前提条件):
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);
        let pusher = WebSocketMessagePusher::new();
        let (stale_tx, _stale_rx) = mpsc::unbounded_channel();
        let (tx, mut rx) = mpsc::unbounded_channel();
        pusher.register_client(ConnectionId::from("stale"), stale_tx).await;
        pusher.register_client(ConnectionId::from("alive"), tx).await;
        pusher.unregister_client(&ConnectionId::from("stale")).await;

        // when (操作):
        let targets = vec![ConnectionId::from("stale"), ConnectionId::from("alive")];
        let result = pusher.broadcast(targets, &registered("alice")).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(
            parse(rx.recv().await),
            json!({"type": "register", "id": "alice"})
        );
        assert_eq!(logs.contents(), "");
    }

    #[tokio::test]
    async fn test_broadcast_empty_targets() {
        // テスト項目: 空のターゲットリストでもエラーにならない
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();

        // when (操作):
        let result = pusher.broadcast(vec![], &registered("alice")).await;

        // then (期待する結果):
        assert!(result.is_ok());
    }
}
