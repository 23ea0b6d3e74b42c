//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::{
    domain::MessagePusher,
    usecase::{
        GetGameDetailUseCase, GetGamesUseCase, GetSessionsUseCase, MessageRouter,
        PruneGamesUseCase,
    },
};

use super::{
    dispatcher::spawn_dispatcher,
    handler::{
        get_game_detail, get_games, get_sessions, health_check, prune_games, websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Relay server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     message_router,
///     message_pusher,
///     get_games_usecase,
///     get_game_detail_usecase,
///     get_sessions_usecase,
///     prune_games_usecase,
/// );
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    /// MessageRouter（受信メッセージの振り分け）
    message_router: Arc<MessageRouter>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    /// GetGamesUseCase（ゲーム一覧取得のユースケース）
    get_games_usecase: Arc<GetGamesUseCase>,
    /// GetGameDetailUseCase（ゲーム詳細取得のユースケース）
    get_game_detail_usecase: Arc<GetGameDetailUseCase>,
    /// GetSessionsUseCase（セッション一覧取得のユースケース）
    get_sessions_usecase: Arc<GetSessionsUseCase>,
    /// PruneGamesUseCase（空ゲーム削除のユースケース）
    prune_games_usecase: Arc<PruneGamesUseCase>,
}

impl Server {
    pub fn new(
        message_router: Arc<MessageRouter>,
        message_pusher: Arc<dyn MessagePusher>,
        get_games_usecase: Arc<GetGamesUseCase>,
        get_game_detail_usecase: Arc<GetGameDetailUseCase>,
        get_sessions_usecase: Arc<GetSessionsUseCase>,
        prune_games_usecase: Arc<PruneGamesUseCase>,
    ) -> Self {
        Self {
            message_router,
            message_pusher,
            get_games_usecase,
            get_game_detail_usecase,
            get_sessions_usecase,
            prune_games_usecase,
        }
    }

    /// Build the axum application and start the dispatcher task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn into_app(self) -> Router {
        let (dispatcher, _dispatcher_handle) =
            spawn_dispatcher(self.message_router, self.prune_games_usecase);

        let app_state = Arc::new(AppState {
            dispatcher,
            message_pusher: self.message_pusher,
            get_games_usecase: self.get_games_usecase,
            get_game_detail_usecase: self.get_game_detail_usecase,
            get_sessions_usecase: self.get_sessions_usecase,
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/games", get(get_games))
            .route("/api/games/prune", post(prune_games))
            .route("/api/games/{game_key}", get(get_game_detail))
            .route("/api/sessions", get(get_sessions))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Run the relay server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.into_app();

        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!("Relay server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        // Set up graceful shutdown signal handler
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
