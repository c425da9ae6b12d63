/*
 * Responsibility
 * - Refresh ヘッダ (scheme なし) から旧トークンを取り出す
 * - rlt のみを確認し、期限を now から計算し直した新トークンを発行
 * - 400 / 401 / 200 (/ 500) の振り分け
 */
use axum::{
    Json,
    http::{StatusCode, request::Parts},
};
use tracing::{debug, error};

use crate::api::v1::dto::token_response::TokenResponse;
use crate::services::auth::engine::{AuthEngine, TokenError};
use crate::wire::Wire;

pub const REFRESH_HEADER: &str = "Refresh";

#[derive(Debug)]
pub enum RefreshOutcome<T> {
    /// no `Refresh` header
    Missing,
    Rejected(TokenError),
    Refreshed(T),
}

impl<W: Wire> AuthEngine<W> {
    /// Decision half of the refresh flow: the identity carried by a still
    /// refreshable token.
    pub fn refresh_request(&self, request: &Parts) -> RefreshOutcome<W::Value> {
        let Some(raw) = request.headers.get(REFRESH_HEADER) else {
            return RefreshOutcome::Missing;
        };
        let Ok(token) = raw.to_str() else {
            return RefreshOutcome::Rejected(TokenError::Malformed(
                "refresh header is not visible ascii".into(),
            ));
        };

        match self.decode_for_refresh(token.trim()) {
            Ok(identity) => RefreshOutcome::Refreshed(identity),
            Err(e) => RefreshOutcome::Rejected(e),
        }
    }

    pub fn refresh_response(&self, request: &Parts) -> (StatusCode, Json<TokenResponse>) {
        let identity = match self.refresh_request(request) {
            RefreshOutcome::Missing => {
                debug!(engine = %self.name(), outcome = "missing", "refresh without token");
                return (StatusCode::BAD_REQUEST, Json(TokenResponse::invalid()));
            }
            RefreshOutcome::Rejected(e) => {
                debug!(engine = %self.name(), outcome = e.outcome(), error = %e, "refresh rejected");
                return (StatusCode::UNAUTHORIZED, Json(TokenResponse::invalid()));
            }
            RefreshOutcome::Refreshed(identity) => identity,
        };

        match self.encode(&identity) {
            Ok(token) => {
                debug!(engine = %self.name(), outcome = "success", "token refreshed");
                (StatusCode::OK, Json(TokenResponse::valid(token)))
            }
            Err(e) => {
                error!(engine = %self.name(), error = %e, "failed to issue token on refresh");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(TokenResponse::invalid()))
            }
        }
    }
}
