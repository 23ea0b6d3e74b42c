//! メッセージ送信（通知）のインターフェース
//!
//! UseCase 層はこの trait を通じて接続へメッセージを届けます。
//! ワイヤーフォーマットへの変換は実装側（Infrastructure 層）の責務です。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError, OutboundMessage};

/// Outbound channel of a single connection (carries encoded text frames)
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// MessagePusher trait
///
/// Delivery is fire-and-forget: a successful push only means the message was
/// handed to the connection's writer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続の送信チャンネルを登録
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// 接続の送信チャンネルを削除
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// 特定の接続にメッセージを送信
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        message: &OutboundMessage,
    ) -> Result<(), MessagePushError>;

    /// 複数の接続にメッセージを送信
    ///
    /// Each target is delivered independently; an unreachable target never
    /// aborts delivery to the others. Only a message that cannot be encoded
    /// at all is reported as an error.
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        message: &OutboundMessage,
    ) -> Result<(), MessagePushError>;
}
