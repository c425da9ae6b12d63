/*
 * Responsibility
 * - Config読み込み → 依存生成 (key / repo / engine / StatelessAuthConfig) → Router 組み立て
 * - Middleware の適用 (認証 dispatcher, request id / trace など)
 * - axum::serve() で起動
 */
use std::collections::BTreeMap;
use std::{panic, process, sync::Arc};

use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::{Config, ConfigError};
use crate::domain::auth::UserWire;
use crate::error::AppError;
use crate::middleware;
use crate::repos::UserRepo;
use crate::services::auth::middleware_config::DEFAULT_ENGINE;
use crate::services::auth::{AuthEngine, QueryCredentialView, StatelessAuthConfig, TokenDecoder};
use crate::state::AppState;
use crate::wire::Wire;

/// Prefix the default engine's acquire / refresh endpoints are nested under.
pub const ACCOUNT_PREFIX: &str = "/account";

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,statelessauth=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development: crash the whole process so we notice immediately
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<(), AppError> {
    init_tracing();
    let config = Config::from_env().inspect_err(|e| tracing::error!(error = %e, "config"))?;

    let abort_on_panic = !config.app_env.is_production();
    init_panic_hook(abort_on_panic);

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let engine = Arc::new(build_engine(&config)?);
    let state = build_state(&config, engine.clone())?;
    let app = build_router(state, engine);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, addr = %config.addr, "bind failed");
            AppError::Internal
        })?;
    axum::serve(listener, app).await.map_err(|e| {
        tracing::error!(error = %e, "server error");
        AppError::Internal
    })?;

    Ok(())
}

/// Refresh engine over `UserWire`, acquiring through the seeded user store.
pub fn build_engine(config: &Config) -> Result<AuthEngine<UserWire>, AppError> {
    let key = config.key.load()?;
    // acquire / refresh issue tokens; refresh and every middleware entry verify them
    if !key.can_sign() {
        return Err(ConfigError::Missing("AUTH_PRIVATE_KEY_PEM").into());
    }
    if !key.can_verify() {
        return Err(ConfigError::Missing("AUTH_PUBLIC_KEY_PEM").into());
    }
    let repo = Arc::new(UserRepo::from_seed(config.users.clone())?);
    tracing::info!(users = repo.len(), key = ?key, "credential store ready");

    let engine = AuthEngine::refresh(
        DEFAULT_ENGINE,
        key,
        UserWire::new(),
        Arc::new(QueryCredentialView::new(repo)),
        config.refresh_policy(),
    );

    Ok(match &config.algorithms {
        Some(algorithms) => engine.with_algorithms(algorithms.clone()),
        None => engine,
    })
}

pub fn build_state(
    config: &Config,
    engine: Arc<AuthEngine<UserWire>>,
) -> Result<AppState, AppError> {
    let keys = BTreeMap::from([(DEFAULT_ENGINE.to_string(), engine.key.clone())]);
    let engines: BTreeMap<String, Arc<dyn TokenDecoder>> =
        BTreeMap::from([(DEFAULT_ENGINE.to_string(), engine as Arc<dyn TokenDecoder>)]);

    let auth = StatelessAuthConfig::new(keys, engines, config.middlewares.clone())?;
    for (name, cfg) in auth.middlewares() {
        tracing::info!(middleware = %name, engine = %cfg.engine, field = %cfg.field, "auth middleware");
    }

    Ok(AppState::new(Arc::new(auth)))
}

pub fn build_router<W: Wire>(state: AppState, engine: Arc<AuthEngine<W>>) -> Router {
    let router = Router::new()
        .merge(api::v1::routes())
        .nest(ACCOUNT_PREFIX, engine.routes())
        .with_state(state.clone());

    let router = middleware::auth::access::apply(router, state.auth);
    middleware::http::apply(router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeySource;
    use crate::domain::auth::User;
    use crate::services::auth::KeyFamily;

    const ED_PRIVATE: &str = include_str!("../tests/fixtures/ed25519_private.pem");
    const ED_PUBLIC: &str = include_str!("../tests/fixtures/ed25519_public.pem");

    fn config(private_pem: Option<&str>, public_pem: Option<&str>) -> Config {
        let mut config = Config::from_vars(|key| match key {
            "AUTH_KEY_TYPE" => Some("hmac".to_string()),
            "AUTH_HMAC_SECRET" => Some("s".to_string()),
            _ => None,
        })
        .unwrap();
        config.key = KeySource::Pem {
            family: KeyFamily::Ed,
            private_pem: private_pem.map(str::to_string),
            public_pem: public_pem.map(str::to_string),
        };
        config
    }

    #[test]
    fn engine_round_trips_with_both_halves() {
        let engine = build_engine(&config(Some(ED_PRIVATE), Some(ED_PUBLIC))).unwrap();
        let user = User::authenticated("user");

        let token = engine.encode(&user).unwrap();
        assert_eq!(engine.decode(&token).unwrap(), user);
    }

    #[test]
    fn engine_refuses_a_key_it_cannot_verify_with() {
        let err = build_engine(&config(Some(ED_PRIVATE), None)).unwrap_err();
        assert!(matches!(&err, AppError::Startup(msg) if msg.contains("AUTH_PUBLIC_KEY_PEM")));
    }

    #[test]
    fn engine_refuses_a_key_it_cannot_sign_with() {
        let err = build_engine(&config(None, Some(ED_PUBLIC))).unwrap_err();
        assert!(matches!(&err, AppError::Startup(msg) if msg.contains("AUTH_PRIVATE_KEY_PEM")));
    }
}
