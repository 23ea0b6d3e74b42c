//! Session and game relay server.
//!
//! Clients register a session, join a game by its address and push state
//! updates that are fanned out to every member of that game.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin cellrelay-server
//! cargo run --bin cellrelay-server -- --host 0.0.0.0 --port 3000 --log-level debug
//! ```

use std::sync::Arc;

use cellrelay_server::{
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{
            InMemoryConnectionRegistry, InMemoryGameRepository, InMemorySessionRepository,
        },
    },
    ui::Server,
    usecase::{
        DisconnectPolicy, GameBroadcaster, GetGameDetailUseCase, GetGamesUseCase,
        GetSessionsUseCase, JoinGameUseCase, MessageRouter, PruneGamesUseCase,
        RegisterSessionUseCase, UpdateGameUseCase,
    },
};
use cellrelay_shared::{logger::setup_logger, time::SystemClock};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "cellrelay-server")]
#[command(about = "Session and game relay server over WebSocket", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Default log level (overridden by RUST_LOG)
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,

    /// Unbind a connection from its session as soon as it closes
    #[arg(long)]
    unbind_on_disconnect: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    // Initialize dependencies in order:
    // 1. Repository
    // 2. MessagePusher
    // 3. UseCases
    // 4. Server

    // 1. Create Repositories (in-memory database)
    let sessions = Arc::new(InMemorySessionRepository::new());
    let connections = Arc::new(InMemoryConnectionRegistry::new());
    let games = Arc::new(InMemoryGameRepository::new());
    let clock = Arc::new(SystemClock);

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. Create UseCases
    let broadcaster = Arc::new(GameBroadcaster::new(
        sessions.clone(),
        connections.clone(),
        message_pusher.clone(),
    ));
    let register_session_usecase = Arc::new(RegisterSessionUseCase::new(
        sessions.clone(),
        connections.clone(),
        message_pusher.clone(),
        clock.clone(),
    ));
    let join_game_usecase = Arc::new(JoinGameUseCase::new(
        sessions.clone(),
        games.clone(),
        broadcaster.clone(),
    ));
    let update_game_usecase = Arc::new(UpdateGameUseCase::new(
        sessions.clone(),
        games.clone(),
        broadcaster,
    ));
    let disconnect_policy = if args.unbind_on_disconnect {
        DisconnectPolicy::Unbind
    } else {
        DisconnectPolicy::Retain
    };
    let message_router = Arc::new(MessageRouter::new(
        connections,
        sessions.clone(),
        register_session_usecase,
        join_game_usecase,
        update_game_usecase,
        clock,
        disconnect_policy,
    ));
    let get_games_usecase = Arc::new(GetGamesUseCase::new(games.clone()));
    let get_game_detail_usecase = Arc::new(GetGameDetailUseCase::new(games.clone()));
    let get_sessions_usecase = Arc::new(GetSessionsUseCase::new(sessions));
    let prune_games_usecase = Arc::new(PruneGamesUseCase::new(games));

    tracing::info!("Disconnect policy: {:?}", disconnect_policy);

    // 4. Create and run the server
    let server = Server::new(
        message_router,
        message_pusher,
        get_games_usecase,
        get_game_detail_usecase,
        get_sessions_usecase,
        prune_games_usecase,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
