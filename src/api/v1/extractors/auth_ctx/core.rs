use axum::extract::FromRequestParts;
use axum::http::{StatusCode, request::Parts};

use super::AuthContext;

/// Handler で AuthContext を受け取るための extractor
/// middleware が AuthContext を request.extensions() に insert 済みである前提
/// 見つからない場合は 401 を返す (ミドルウェア未設定)
pub struct AuthCtxExtractor(pub AuthContext);

impl<S> FromRequestParts<S> for AuthCtxExtractor
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(AuthCtxExtractor)
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}
