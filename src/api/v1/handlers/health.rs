/*
 * Responsibility
 * - GET /health (疎通用)
 * - 評価される認証 middleware の一覧も返す (設定確認用)
 */
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let middlewares: Vec<&str> = state
        .auth
        .middlewares()
        .iter()
        .map(|(name, _)| name.as_str())
        .collect();

    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "middlewares": middlewares })),
    )
}
