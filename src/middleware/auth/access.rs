//! 設定された各エントリの header から token を取り出して decode し、
//! field ごとの identity を AuthContext として extensions に入れる
//!
//! - エントリは名前順に評価する (StatelessAuthConfig が並び替え済み)
//! - header なし / scheme 不一致 (Skip) / urls 対象外 -> field は None のまま次へ
//! - decode 失敗 -> 403、残りのエントリも handler も実行しない

use std::sync::Arc;

use axum::{
    Router,
    extract::{OriginalUri, Request, State},
    http::HeaderMap,
    middleware::{self, Next},
    response::Response,
};
use thiserror::Error;

use crate::api::v1::extractors::AuthContext;
use crate::error::AppError;
use crate::services::auth::{HeaderToken, SchemeMismatch, StatelessAuthConfig};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("middleware {middleware:?} rejected the request")]
    Forbidden { middleware: String },
    #[error("middleware {middleware:?} refers to unknown engine {engine:?}")]
    UnknownEngine { middleware: String, engine: String },
}

impl From<DispatchError> for AppError {
    fn from(e: DispatchError) -> Self {
        match e {
            DispatchError::Forbidden { .. } => AppError::Forbidden,
            DispatchError::UnknownEngine { .. } => AppError::Internal,
        }
    }
}

/// Runs every middleware entry against one request.
pub fn evaluate(
    config: &StatelessAuthConfig,
    headers: &HeaderMap,
    path: &str,
) -> Result<AuthContext, DispatchError> {
    let mut ctx = AuthContext::new();

    for (name, cfg) in config.middlewares() {
        if !cfg.applies_to(path) {
            tracing::trace!(middleware = %name, path, outcome = "out_of_scope", "skipped");
            ctx.set(cfg.field.as_str(), None);
            continue;
        }

        let engine = config
            .get_engine(&cfg.engine)
            .ok_or_else(|| DispatchError::UnknownEngine {
                middleware: name.clone(),
                engine: cfg.engine.clone(),
            })?;

        let token = match cfg.extract_token(headers) {
            HeaderToken::Absent => {
                tracing::trace!(middleware = %name, outcome = "missing", "no auth header");
                ctx.set(cfg.field.as_str(), None);
                continue;
            }
            HeaderToken::SchemeMismatch if cfg.on_scheme_mismatch == SchemeMismatch::Skip => {
                tracing::debug!(middleware = %name, outcome = "no_type", "scheme prefix mismatch");
                ctx.set(cfg.field.as_str(), None);
                continue;
            }
            HeaderToken::SchemeMismatch | HeaderToken::Unreadable => {
                tracing::warn!(middleware = %name, outcome = "no_type", "auth header rejected");
                return Err(DispatchError::Forbidden {
                    middleware: name.clone(),
                });
            }
            HeaderToken::Present(token) => token,
        };

        match engine.decode_identity(token) {
            Ok(identity) => {
                tracing::debug!(middleware = %name, engine = %engine.engine_name(), outcome = "valid", "token accepted");
                ctx.set(cfg.field.as_str(), Some(identity));
            }
            Err(e) => {
                tracing::warn!(
                    middleware = %name,
                    engine = %engine.engine_name(),
                    outcome = "wrong_token",
                    reason = e.outcome(),
                    error = %e,
                    "token rejected"
                );
                return Err(DispatchError::Forbidden {
                    middleware: name.clone(),
                });
            }
        }
    }

    Ok(ctx)
}

/// 認証 dispatcher を router 全体に掛ける
///
/// 例：
/// ```ignore
/// let app = middleware::auth::access::apply(app, state.auth.clone());
/// ```
pub fn apply<S>(router: Router<S>, config: Arc<StatelessAuthConfig>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(config, access_middleware))
}

async fn access_middleware(
    State(config): State<Arc<StatelessAuthConfig>>,
    OriginalUri(original_uri): OriginalUri,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ctx = evaluate(&config, req.headers(), original_uri.path()).map_err(|e| {
        if let DispatchError::UnknownEngine { .. } = &e {
            tracing::error!(error = %e, "auth dispatcher misconfigured");
        }
        AppError::from(e)
    })?;

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(ctx);

    Ok(next.run(req).await)
}
