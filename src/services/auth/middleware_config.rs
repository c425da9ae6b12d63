/*
 * Responsibility
 * - 1 エントリ分の認証設定 (engine 名 / header / field / urls)
 * - header 値から token を取り出す (scheme prefix の除去)
 * - JSON 設定 (AUTH_MIDDLEWARES) からの deserialize
 */
use axum::http::HeaderMap;
use serde::Deserialize;

pub const DEFAULT_ENGINE: &str = "default";
pub const DEFAULT_HEADER: &str = "Authorization";
pub const DEFAULT_SCHEME: &str = "Bearer";
pub const DEFAULT_FIELD: &str = "unknown";

/// Header name plus optional scheme prefix. An empty scheme means the whole
/// header value is the token.
///
/// Deserializes from a two element array, e.g. `["Authorization", "Bearer"]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "(String, String)")]
pub struct HeaderSpec {
    pub name: String,
    pub scheme: String,
}

impl From<(String, String)> for HeaderSpec {
    fn from((name, scheme): (String, String)) -> Self {
        Self { name, scheme }
    }
}

impl Default for HeaderSpec {
    fn default() -> Self {
        Self::new(DEFAULT_HEADER, DEFAULT_SCHEME)
    }
}

impl HeaderSpec {
    pub fn new(name: impl Into<String>, scheme: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scheme: scheme.into(),
        }
    }
}

/// What the dispatcher does with a header that is present but does not start
/// with `"<scheme> "`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemeMismatch {
    /// same as header absent: field left unset
    #[default]
    Skip,
    /// 403
    Reject,
}

/// Result of looking up the token for one middleware entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderToken<'a> {
    Absent,
    SchemeMismatch,
    /// header bytes are not visible ASCII
    Unreadable,
    Present(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MiddlewareConfig {
    pub engine: String,
    pub header: HeaderSpec,
    pub field: String,
    /// Path prefixes this entry applies to; `None` means every path.
    pub urls: Option<Vec<String>>,
    pub on_scheme_mismatch: SchemeMismatch,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            engine: DEFAULT_ENGINE.to_string(),
            header: HeaderSpec::default(),
            field: DEFAULT_FIELD.to_string(),
            urls: None,
            on_scheme_mismatch: SchemeMismatch::default(),
        }
    }
}

impl MiddlewareConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = engine.into();
        self
    }

    pub fn header(mut self, name: impl Into<String>, scheme: impl Into<String>) -> Self {
        self.header = HeaderSpec::new(name, scheme);
        self
    }

    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    pub fn urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.urls = Some(urls.into_iter().map(Into::into).collect());
        self
    }

    pub fn on_scheme_mismatch(mut self, policy: SchemeMismatch) -> Self {
        self.on_scheme_mismatch = policy;
        self
    }

    pub fn applies_to(&self, path: &str) -> bool {
        match &self.urls {
            None => true,
            Some(prefixes) => prefixes.iter().any(|p| path.starts_with(p.as_str())),
        }
    }

    pub fn extract_token<'a>(&self, headers: &'a HeaderMap) -> HeaderToken<'a> {
        let Some(raw) = headers.get(self.header.name.as_str()) else {
            return HeaderToken::Absent;
        };
        let Ok(value) = raw.to_str() else {
            return HeaderToken::Unreadable;
        };

        if self.header.scheme.is_empty() {
            return HeaderToken::Present(value);
        }

        match value
            .strip_prefix(self.header.scheme.as_str())
            .and_then(|rest| rest.strip_prefix(' '))
        {
            Some(token) => HeaderToken::Present(token),
            None => HeaderToken::SchemeMismatch,
        }
    }
}
