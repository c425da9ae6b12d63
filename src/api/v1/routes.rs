/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /health, / (greeting)
 * - engine ごとの acquire / refresh エンドポイント (AuthEngine::routes)
 */
use std::sync::Arc;

use axum::{Router, routing::get};

use crate::api::v1::handlers::{health::health, home::home, token};
use crate::services::auth::AuthEngine;
use crate::state::AppState;
use crate::wire::Wire;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
}

impl<W: Wire> AuthEngine<W> {
    /// Token endpoints this engine serves, to be nested under a prefix:
    /// `/acquire` when it has a credential view, `/refresh` when its tokens
    /// carry refresh deadlines. A plain engine serves nothing.
    /// Each path is also served with a trailing slash (`/acquire/`, `/refresh/`).
    pub fn routes<S>(self: Arc<Self>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let mut router: Router<Arc<Self>> = Router::new();
        if self.credentials().is_some() {
            router = router
                .route("/acquire", get(token::acquire::<W>))
                .route("/acquire/", get(token::acquire::<W>));
        }
        if self.refresh_policy().is_some() {
            router = router
                .route("/refresh", get(token::refresh::<W>))
                .route("/refresh/", get(token::refresh::<W>));
        }
        router.with_state(self)
    }
}
