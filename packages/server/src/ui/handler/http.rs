//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use tokio::sync::oneshot;

use crate::{
    infrastructure::dto::{
        http::{GameSummaryDto, PruneResultDto, SessionSummaryDto},
        websocket::GameSnapshotDto,
    },
    ui::{dispatcher::InboundEvent, state::AppState},
    usecase::GetGameDetailError,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of games
pub async fn get_games(State(state): State<Arc<AppState>>) -> Json<Vec<GameSummaryDto>> {
    let games = state.get_games_usecase.execute().await;

    // Domain Model から DTO への変換
    Json(games.iter().map(GameSummaryDto::from).collect())
}

/// Get the snapshot of a game by its address
pub async fn get_game_detail(
    State(state): State<Arc<AppState>>,
    Path(game_key): Path<String>,
) -> Result<Json<GameSnapshotDto>, StatusCode> {
    match state.get_game_detail_usecase.execute(game_key).await {
        Ok(game) => Ok(Json(GameSnapshotDto::from(&game))),
        Err(GetGameDetailError::GameNotFound(key)) => {
            tracing::debug!("Game '{}' not found", key);
            Err(StatusCode::NOT_FOUND)
        }
    }
}

/// Get list of sessions
pub async fn get_sessions(State(state): State<Arc<AppState>>) -> Json<Vec<SessionSummaryDto>> {
    let sessions = state.get_sessions_usecase.execute().await;
    Json(sessions.iter().map(SessionSummaryDto::from).collect())
}

/// Remove every game without members
///
/// Runs on the dispatcher between two inbound messages, never in the middle
/// of one.
pub async fn prune_games(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PruneResultDto>, StatusCode> {
    let (reply, removed) = oneshot::channel();
    if state
        .dispatcher
        .send(InboundEvent::PruneGames { reply })
        .is_err()
    {
        tracing::error!("Dispatcher is gone; cannot prune games");
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    match removed.await {
        Ok(removed) => Ok(Json(PruneResultDto {
            removed: removed.into_iter().map(|key| key.into_string()).collect(),
        })),
        Err(_) => {
            tracing::error!("Dispatcher dropped the prune request");
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
