/*
 * Responsibility
 * - ドメイン値の署名 (encode) と検証 (decode)
 * - 署名ポリシー (key + algorithms) と Lifecycle (Plain / Refresh) の合成
 * - 検証失敗は TokenError に集約し、呼び出し側が Result / Option を選ぶ
 */
use std::any::Any;
use std::fmt;
use std::sync::Arc;

use jsonwebtoken::{Algorithm, Header, TokenData, Validation, errors::ErrorKind};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use crate::services::auth::acquire::CredentialView;
use crate::services::auth::clock::{Clock, SystemClock};
use crate::services::auth::key::Key;
use crate::services::auth::lifecycle::{Lifecycle, RefreshClaims, RefreshPolicy};
use crate::wire::{Wire, WireError};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("algorithm {0:?} is not accepted by this engine")]
    UnsupportedAlgorithm(Algorithm),
    #[error("engine has no algorithms configured")]
    NoAlgorithms,
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("token deadline has passed")]
    Expired,
    #[error("payload does not match the wire: {0}")]
    Wire(#[from] WireError),
    #[error("key has no {0} half")]
    KeyUnavailable(&'static str),
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl TokenError {
    /// Short label used in log events.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Expired => "expired",
            Self::Signing(_) | Self::KeyUnavailable(_) | Self::NoAlgorithms => "misconfigured",
            _ => "wrong",
        }
    }
}

fn verification_error(e: jsonwebtoken::errors::Error) -> TokenError {
    match e.kind() {
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        _ => TokenError::Malformed(e.to_string()),
    }
}

/// Decoded identity with its concrete type erased; see `AuthContext::get`.
pub type Identity = Arc<dyn Any + Send + Sync>;

/// Object-safe decoding surface used by the middleware dispatcher, so engines
/// over different wires can share one registry.
pub trait TokenDecoder: Send + Sync + fmt::Debug {
    fn engine_name(&self) -> &str;

    /// Access-path decode (signature + access deadline).
    fn decode_identity(&self, token: &str) -> Result<Identity, TokenError>;
}

/// Signs and verifies tokens for one domain type.
///
/// Acquisition (credential -> token) and refresh (access + refresh deadlines)
/// are composed in through `with_credentials` / `with_refresh` rather than
/// separate engine types.
pub struct AuthEngine<W: Wire> {
    name: String,
    /// Signing / verification key. Reconfigurable post-construction, e.g. to
    /// keep only the public half or to swap in another key.
    pub key: Key,
    /// The first entry signs; every entry is accepted when verifying.
    /// Reconfigurable post-construction.
    pub algorithms: Vec<Algorithm>,
    wire: W,
    lifecycle: Lifecycle,
    credentials: Option<Arc<dyn CredentialView<W::Value>>>,
    clock: Arc<dyn Clock>,
}

impl<W: Wire> fmt::Debug for AuthEngine<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthEngine")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("algorithms", &self.algorithms)
            .field("lifecycle", &self.lifecycle)
            .field("acquire", &self.credentials.is_some())
            .finish()
    }
}

impl<W: Wire> AuthEngine<W> {
    /// Plain engine: sign / verify only, algorithms default to the key family's.
    pub fn new(name: impl Into<String>, key: Key, wire: W) -> Self {
        let algorithms = vec![key.family().default_algorithm()];
        Self {
            name: name.into(),
            key,
            algorithms,
            wire,
            lifecycle: Lifecycle::Plain,
            credentials: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Engine that can also turn credentials into a token.
    pub fn acquire(
        name: impl Into<String>,
        key: Key,
        wire: W,
        credentials: Arc<dyn CredentialView<W::Value>>,
    ) -> Self {
        Self::new(name, key, wire).with_credentials(credentials)
    }

    /// Acquiring engine whose tokens carry access and refresh deadlines.
    pub fn refresh(
        name: impl Into<String>,
        key: Key,
        wire: W,
        credentials: Arc<dyn CredentialView<W::Value>>,
        policy: RefreshPolicy,
    ) -> Self {
        Self::acquire(name, key, wire, credentials).with_refresh(policy)
    }

    pub fn with_algorithms(mut self, algorithms: Vec<Algorithm>) -> Self {
        self.algorithms = algorithms;
        self
    }

    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialView<W::Value>>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_refresh(mut self, policy: RefreshPolicy) -> Self {
        self.lifecycle = Lifecycle::Refresh(policy);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn wire(&self) -> &W {
        &self.wire
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn refresh_policy(&self) -> Option<RefreshPolicy> {
        self.lifecycle.refresh_policy()
    }

    pub fn credentials(&self) -> Option<&Arc<dyn CredentialView<W::Value>>> {
        self.credentials.as_ref()
    }

    pub fn now_nanos(&self) -> i64 {
        self.clock.now_nanos()
    }

    pub fn encode(&self, value: &W::Value) -> Result<String, TokenError> {
        let wired = self.wire.encode(value)?;
        let payload = self.payload_from_wired(wired);
        self.sign(&payload)
    }

    /// Signs an already-shaped payload with `algorithms[0]`.
    pub fn sign(&self, payload: &Value) -> Result<String, TokenError> {
        let algorithm = *self.algorithms.first().ok_or(TokenError::NoAlgorithms)?;
        if !self.key.supports(algorithm) {
            return Err(TokenError::UnsupportedAlgorithm(algorithm));
        }
        let key = self
            .key
            .encoding_key()
            .ok_or(TokenError::KeyUnavailable("private"))?;

        let mut header = Header::new(algorithm);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, payload, key).map_err(|e| {
            error!(engine = %self.name, error = %e, "failed to sign token");
            TokenError::Signing(e)
        })
    }

    /// Signature check only; returns the raw payload.
    pub fn verify(&self, token: &str) -> Result<Value, TokenError> {
        let header = jsonwebtoken::decode_header(token).map_err(verification_error)?;
        if !self.algorithms.contains(&header.alg) || !self.key.supports(header.alg) {
            return Err(TokenError::UnsupportedAlgorithm(header.alg));
        }
        let key = self
            .key
            .decoding_key()
            .ok_or(TokenError::KeyUnavailable("public"))?;

        // Deadlines live in alt/rlt, not in registered claims.
        let mut validation = Validation::new(header.alg);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_aud = false;

        let data: TokenData<Value> =
            jsonwebtoken::decode(token, key, &validation).map_err(verification_error)?;
        Ok(data.claims)
    }

    /// Access-path decode: signature, then `alt` for refresh engines.
    pub fn decode(&self, token: &str) -> Result<W::Value, TokenError> {
        let (claims, wired) = self.verified_parts(token)?;
        if let Some(claims) = claims {
            if !claims.access_valid_at(self.now_nanos()) {
                return Err(TokenError::Expired);
            }
        }
        Ok(self.wire.decode(&wired)?)
    }

    /// Non-raising variant of `decode`.
    pub fn decode_opt(&self, token: &str) -> Option<W::Value> {
        match self.decode(token) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(engine = %self.name, outcome = e.outcome(), error = %e, "token rejected");
                None
            }
        }
    }

    /// Refresh-path decode: signature and `rlt` only, `alt` may have passed.
    pub fn decode_for_refresh(&self, token: &str) -> Result<W::Value, TokenError> {
        let (claims, wired) = self.verified_parts(token)?;
        let claims = claims
            .ok_or_else(|| TokenError::Malformed("token carries no refresh deadline".into()))?;
        if !claims.refresh_valid_at(self.now_nanos()) {
            return Err(TokenError::Expired);
        }
        Ok(self.wire.decode(&wired)?)
    }

    pub fn payload_from_wired(&self, wired: Value) -> Value {
        self.lifecycle.payload_from_wired(wired, self.now_nanos())
    }

    pub fn wired_from_payload(&self, payload: Value) -> Result<Value, TokenError> {
        self.split_payload(payload).map(|(_, wired)| wired)
    }

    /// True iff the payload's access deadline has not passed. Plain payloads
    /// have no deadline and are always valid.
    pub fn validate_payload(&self, payload: &Value) -> bool {
        match self.split_payload(payload.clone()) {
            Ok((Some(claims), _)) => claims.access_valid_at(self.now_nanos()),
            Ok((None, _)) => true,
            Err(_) => false,
        }
    }

    fn split_payload(&self, payload: Value) -> Result<(Option<RefreshClaims>, Value), TokenError> {
        self.lifecycle
            .split_payload(payload)
            .map_err(|e| TokenError::Malformed(format!("payload: {e}")))
    }

    fn verified_parts(&self, token: &str) -> Result<(Option<RefreshClaims>, Value), TokenError> {
        let payload = self.verify(token)?;
        self.split_payload(payload)
    }
}

impl<W: Wire> TokenDecoder for AuthEngine<W> {
    fn engine_name(&self) -> &str {
        &self.name
    }

    fn decode_identity(&self, token: &str) -> Result<Identity, TokenError> {
        self.decode(token).map(|v| Arc::new(v) as Identity)
    }
}
