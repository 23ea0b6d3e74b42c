//! HTTP API response DTOs.

use serde::Serialize;
use serde_json::Value;

/// Game summary for `GET /api/games`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummaryDto {
    pub server_address: String,
    pub members: Vec<String>,
}

/// Session summary for `GET /api/sessions`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummaryDto {
    pub id: String,
    pub connection_id: Option<String>,
    pub game: Option<String>,
    /// Display name exactly as sent on join (any JSON value)
    pub name: Option<Value>,
    pub connected_at: String,
    pub last_seen_at: String,
}

/// Result of `POST /api/games/prune`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PruneResultDto {
    pub removed: Vec<String>,
}
