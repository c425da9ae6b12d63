#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    Router,
    body::{Body, Bytes, to_bytes},
    http::{Request, StatusCode},
};
use tower::ServiceExt;

use statelessauth::app::build_router;
use statelessauth::domain::auth::UserWire;
use statelessauth::repos::{SeedUser, UserRepo};
use statelessauth::services::auth::{
    AuthEngine, Key, MiddlewareConfig, QueryCredentialView, RefreshPolicy, StatelessAuthConfig,
    TokenDecoder,
};
use statelessauth::state::AppState;
use statelessauth::wire::Wire;

pub const RSA_PRIVATE: &str = include_str!("../fixtures/rsa_private.pem");
pub const RSA_PUBLIC: &str = include_str!("../fixtures/rsa_public.pem");
pub const RSA_OTHER_PRIVATE: &str = include_str!("../fixtures/rsa_other_private.pem");
pub const RSA_OTHER_PUBLIC: &str = include_str!("../fixtures/rsa_other_public.pem");
pub const ED_PRIVATE: &str = include_str!("../fixtures/ed25519_private.pem");
pub const ED_PUBLIC: &str = include_str!("../fixtures/ed25519_public.pem");

pub fn rsa_key() -> Key {
    Key::rsa_pem(Some(RSA_PRIVATE), Some(RSA_PUBLIC)).unwrap()
}

pub fn other_rsa_key() -> Key {
    Key::rsa_pem(Some(RSA_OTHER_PRIVATE), Some(RSA_OTHER_PUBLIC)).unwrap()
}

pub fn ed_key() -> Key {
    Key::ed_pem(Some(ED_PRIVATE), Some(ED_PUBLIC)).unwrap()
}

/// "user" / "somepassword" plus an inactive "gone" / "pw".
pub fn user_repo() -> Arc<UserRepo> {
    let mut gone = SeedUser::new("gone", "pw");
    gone.is_active = false;
    Arc::new(UserRepo::from_seed(vec![SeedUser::new("user", "somepassword"), gone]).unwrap())
}

pub fn acquire_engine() -> AuthEngine<UserWire> {
    AuthEngine::acquire(
        "default",
        rsa_key(),
        UserWire::new(),
        Arc::new(QueryCredentialView::new(user_repo())),
    )
}

pub fn refresh_engine(policy: RefreshPolicy) -> AuthEngine<UserWire> {
    acquire_engine().with_refresh(policy)
}

pub fn user_middleware() -> BTreeMap<String, MiddlewareConfig> {
    BTreeMap::from([("auth".to_string(), MiddlewareConfig::new().field("user"))])
}

/// Full router: `/`, `/health`, the engine's token endpoints under `/account`,
/// dispatcher and HTTP layers.
pub fn app<W: Wire>(
    engine: Arc<AuthEngine<W>>,
    middlewares: BTreeMap<String, MiddlewareConfig>,
) -> Router {
    let engines: BTreeMap<String, Arc<dyn TokenDecoder>> = BTreeMap::from([(
        engine.name().to_string(),
        engine.clone() as Arc<dyn TokenDecoder>,
    )]);
    let auth = StatelessAuthConfig::new(BTreeMap::new(), engines, middlewares).unwrap();
    build_router(AppState::new(Arc::new(auth)), engine)
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Bytes) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with(uri: &str, header: &str, value: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header, value)
        .body(Body::empty())
        .unwrap()
}
