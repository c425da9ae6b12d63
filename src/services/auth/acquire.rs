use std::{future::Future, pin::Pin, sync::Arc};

use async_trait::async_trait;
use axum::{
    Json,
    http::{StatusCode, request::Parts},
};
use tracing::{debug, error, warn};

use crate::api::v1::dto::token_response::TokenResponse;
use crate::domain::auth::User;
use crate::services::auth::engine::AuthEngine;
use crate::wire::Wire;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Decides whether an inbound request carries valid credentials.
///
/// This is the only place in the token flow where I/O may happen (credential
/// lookup); any timeout belongs to the implementation.
pub trait CredentialView<T>: Send + Sync {
    fn authenticate<'a>(&'a self, request: &'a Parts) -> BoxFuture<'a, Option<T>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireResult<T> {
    Unauthenticated,
    Authenticated(T),
}

/// Username / password check against an identity store.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn verify_credentials(&self, username: &str, password: &str) -> Option<User>;
}

/// Reads `username` and `password` from the query string.
pub struct QueryCredentialView<S> {
    store: Arc<S>,
}

impl<S> QueryCredentialView<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S: CredentialStore + 'static> CredentialView<User> for QueryCredentialView<S> {
    fn authenticate<'a>(&'a self, request: &'a Parts) -> BoxFuture<'a, Option<User>> {
        Box::pin(async move {
            let Some((username, password)) = request.uri.query().and_then(query_credentials)
            else {
                return None;
            };
            self.store.verify_credentials(&username, &password).await
        })
    }
}

fn query_credentials(query: &str) -> Option<(String, String)> {
    let mut username = None;
    let mut password = None;
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "username" => username = Some(value.into_owned()),
            "password" => password = Some(value.into_owned()),
            _ => {}
        }
    }
    Some((username?, password?))
}

impl<W: Wire> AuthEngine<W> {
    /// Side-effect-free decision: who (if anyone) does this request prove to be?
    pub async fn acquire_request(&self, request: &Parts) -> AcquireResult<W::Value> {
        let Some(view) = self.credentials() else {
            warn!(engine = %self.name(), "acquire on an engine without a credential view");
            return AcquireResult::Unauthenticated;
        };

        match view.authenticate(request).await {
            Some(identity) => AcquireResult::Authenticated(identity),
            None => AcquireResult::Unauthenticated,
        }
    }

    /// 200 + fresh token, or 401 + `{valid: false, token: ""}`.
    pub async fn acquire_response(&self, request: &Parts) -> (StatusCode, Json<TokenResponse>) {
        match self.acquire_request(request).await {
            AcquireResult::Unauthenticated => {
                debug!(engine = %self.name(), outcome = "failed", "acquire rejected");
                (StatusCode::UNAUTHORIZED, Json(TokenResponse::invalid()))
            }
            AcquireResult::Authenticated(identity) => match self.encode(&identity) {
                Ok(token) => {
                    debug!(engine = %self.name(), outcome = "success", "token acquired");
                    (StatusCode::OK, Json(TokenResponse::valid(token)))
                }
                Err(e) => {
                    error!(engine = %self.name(), error = %e, "failed to issue token on acquire");
                    (StatusCode::INTERNAL_SERVER_ERROR, Json(TokenResponse::invalid()))
                }
            },
        }
    }
}
