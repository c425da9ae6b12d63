/*
 * Responsibility
 * - GET <prefix>/acquire, GET <prefix>/refresh
 * - 判定と status の組み立ては engine 側 (acquire_response / refresh_response)
 */
use std::sync::Arc;

use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
};

use crate::api::v1::dto::token_response::TokenResponse;
use crate::services::auth::AuthEngine;
use crate::wire::Wire;

pub async fn acquire<W: Wire>(
    State(engine): State<Arc<AuthEngine<W>>>,
    req: Request,
) -> (StatusCode, Json<TokenResponse>) {
    let (parts, _body) = req.into_parts();
    engine.acquire_response(&parts).await
}

pub async fn refresh<W: Wire>(
    State(engine): State<Arc<AuthEngine<W>>>,
    req: Request,
) -> (StatusCode, Json<TokenResponse>) {
    let (parts, _body) = req.into_parts();
    engine.refresh_response(&parts)
}
