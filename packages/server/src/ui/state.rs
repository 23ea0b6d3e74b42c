//! Server state shared by the handlers.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::{
    domain::MessagePusher,
    usecase::{GetGameDetailUseCase, GetGamesUseCase, GetSessionsUseCase},
};

use super::dispatcher::InboundEvent;

/// Shared application state
pub struct AppState {
    /// 受信イベントと prune 要求を単一のディスパッチャへ送るチャンネル
    pub dispatcher: mpsc::UnboundedSender<InboundEvent>,
    /// MessagePusher（接続ごとの送信チャンネルの登録先）
    pub message_pusher: Arc<dyn MessagePusher>,
    /// GetGamesUseCase（ゲーム一覧取得のユースケース）
    pub get_games_usecase: Arc<GetGamesUseCase>,
    /// GetGameDetailUseCase（ゲーム詳細取得のユースケース）
    pub get_game_detail_usecase: Arc<GetGameDetailUseCase>,
    /// GetSessionsUseCase（セッション一覧取得のユースケース）
    pub get_sessions_usecase: Arc<GetSessionsUseCase>,
}
