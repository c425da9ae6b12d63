/*
 * Responsibility
 * - 環境変数の読み込み (PORT, 鍵, トークン寿命, middleware 設定, seed ユーザー)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::collections::BTreeMap;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;

use crate::repos::SeedUser;
use crate::services::auth::{Key, KeyError, KeyFamily, MiddlewareConfig, RefreshPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Where the default engine's key comes from. Secrets are not printed by Debug.
#[derive(Clone)]
pub enum KeySource {
    Hmac {
        secret: String,
    },
    Pem {
        family: KeyFamily,
        private_pem: Option<String>,
        public_pem: Option<String>,
    },
}

impl fmt::Debug for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySource::Hmac { .. } => f.write_str("Hmac"),
            KeySource::Pem {
                family,
                private_pem,
                public_pem,
            } => f
                .debug_struct("Pem")
                .field("family", family)
                .field("private", &private_pem.is_some())
                .field("public", &public_pem.is_some())
                .finish(),
        }
    }
}

impl KeySource {
    pub fn load(&self) -> Result<Key, KeyError> {
        match self {
            KeySource::Hmac { secret } => Ok(Key::hmac(secret.as_bytes())),
            KeySource::Pem {
                family,
                private_pem,
                public_pem,
            } => {
                let private_pem = private_pem.as_deref();
                let public_pem = public_pem.as_deref();
                match family {
                    KeyFamily::Rsa => Key::rsa_pem(private_pem, public_pem),
                    KeyFamily::Ec => Key::ec_pem(private_pem, public_pem),
                    KeyFamily::Ed => Key::ed_pem(private_pem, public_pem),
                    KeyFamily::Hmac => Err(KeyError::Empty),
                }
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub key: KeySource,
    /// `None`: the key family's default algorithm
    pub algorithms: Option<Vec<Algorithm>>,
    // Token lifetimes (seconds)
    pub access_token_ttl_seconds: u64,
    pub refresh_token_ttl_seconds: u64,
    pub middlewares: BTreeMap<String, MiddlewareConfig>,
    pub users: Vec<SeedUser>,
}

const DEFAULT_MIDDLEWARES: &str =
    r#"{ "auth": { "engine": "default", "header": ["Authorization", "Bearer"], "field": "user" } }"#;

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `var`.
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match var("PORT") {
            Some(s) => s.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(var("APP_ENV"));

        let key = key_source(&var)?;

        let algorithms = var("AUTH_ALGORITHMS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(Algorithm::from_str)
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()
            .map_err(|_| ConfigError::Invalid("AUTH_ALGORITHMS"))?;
        if algorithms.as_ref().is_some_and(Vec::is_empty) {
            return Err(ConfigError::Invalid("AUTH_ALGORITHMS"));
        }

        let access_token_ttl_seconds = var("ACCESS_TOKEN_TTL_SECONDS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(300); // 5 min
        let refresh_token_ttl_seconds = var("REFRESH_TOKEN_TTL_SECONDS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1_209_600); // 14 days

        let middlewares = serde_json::from_str(
            var("AUTH_MIDDLEWARES")
                .as_deref()
                .unwrap_or(DEFAULT_MIDDLEWARES),
        )
        .map_err(|_| ConfigError::Invalid("AUTH_MIDDLEWARES"))?;

        let users = match var("AUTH_USERS") {
            Some(raw) => {
                serde_json::from_str(&raw).map_err(|_| ConfigError::Invalid("AUTH_USERS"))?
            }
            None => Vec::new(),
        };

        Ok(Config {
            addr,
            app_env,
            key,
            algorithms,
            access_token_ttl_seconds,
            refresh_token_ttl_seconds,
            middlewares,
            users,
        })
    }

    pub fn refresh_policy(&self) -> RefreshPolicy {
        RefreshPolicy::new(
            Duration::from_secs(self.access_token_ttl_seconds),
            Duration::from_secs(self.refresh_token_ttl_seconds),
        )
    }
}

fn key_source<F>(var: &F) -> Result<KeySource, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let family = match var("AUTH_KEY_TYPE")
        .unwrap_or_else(|| "rsa".to_string())
        .to_ascii_lowercase()
        .as_str()
    {
        "hmac" => {
            let secret =
                var("AUTH_HMAC_SECRET").ok_or(ConfigError::Missing("AUTH_HMAC_SECRET"))?;
            if secret.is_empty() {
                return Err(ConfigError::Invalid("AUTH_HMAC_SECRET"));
            }
            return Ok(KeySource::Hmac { secret });
        }
        "rsa" => KeyFamily::Rsa,
        "ec" => KeyFamily::Ec,
        "ed25519" | "ed" => KeyFamily::Ed,
        _ => return Err(ConfigError::Invalid("AUTH_KEY_TYPE")),
    };

    // pem は 1 行の env に入れられるよう "\n" を改行に戻す
    let pem = |name: &str| var(name).map(|s| s.replace("\\n", "\n"));
    let private_pem = pem("AUTH_PRIVATE_KEY_PEM");
    let public_pem = pem("AUTH_PUBLIC_KEY_PEM");
    // 同梱 engine は acquire / refresh で署名し、refresh と middleware で検証する
    if private_pem.is_none() {
        return Err(ConfigError::Missing("AUTH_PRIVATE_KEY_PEM"));
    }
    if public_pem.is_none() {
        return Err(ConfigError::Missing("AUTH_PUBLIC_KEY_PEM"));
    }

    Ok(KeySource::Pem {
        family,
        private_pem,
        public_pem,
    })
}
