/*
 * Responsibility
 * - トークンのライフサイクル戦略 (Plain / Refresh)
 * - payload の組み立て (wired + alt + rlt) と取り出し
 * - 期限判定 (alt: access deadline, rlt: refresh deadline)
 */
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::services::auth::clock::duration_nanos;

pub const DEFAULT_ACCESS_LIFETIME: Duration = Duration::from_secs(300);
pub const DEFAULT_REFRESH_LIFETIME: Duration = Duration::from_secs(14 * 24 * 3600);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    pub access_lifetime: Duration,
    pub refresh_lifetime: Duration,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            access_lifetime: DEFAULT_ACCESS_LIFETIME,
            refresh_lifetime: DEFAULT_REFRESH_LIFETIME,
        }
    }
}

impl RefreshPolicy {
    pub fn new(access_lifetime: Duration, refresh_lifetime: Duration) -> Self {
        Self {
            access_lifetime,
            refresh_lifetime,
        }
    }
}

/// Payload layout of a refresh-capable token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub wired: Value,
    /// access deadline, ns since epoch
    pub alt: i64,
    /// refresh deadline, ns since epoch
    pub rlt: i64,
}

impl RefreshClaims {
    pub fn access_valid_at(&self, now_nanos: i64) -> bool {
        now_nanos <= self.alt
    }

    pub fn refresh_valid_at(&self, now_nanos: i64) -> bool {
        now_nanos <= self.rlt
    }
}

/// How an engine shapes and checks the signed payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    /// payload is the wired value itself, no deadline
    #[default]
    Plain,
    Refresh(RefreshPolicy),
}

impl Lifecycle {
    pub fn refresh_policy(&self) -> Option<RefreshPolicy> {
        match self {
            Self::Plain => None,
            Self::Refresh(policy) => Some(*policy),
        }
    }

    pub fn payload_from_wired(&self, wired: Value, now_nanos: i64) -> Value {
        match self {
            Self::Plain => wired,
            Self::Refresh(policy) => serde_json::json!({
                "wired": wired,
                "alt": now_nanos.saturating_add(duration_nanos(policy.access_lifetime)),
                "rlt": now_nanos.saturating_add(duration_nanos(policy.refresh_lifetime)),
            }),
        }
    }

    /// Split a verified payload into its deadlines (if any) and the wired value.
    pub fn split_payload(
        &self,
        payload: Value,
    ) -> Result<(Option<RefreshClaims>, Value), serde_json::Error> {
        match self {
            Self::Plain => Ok((None, payload)),
            Self::Refresh(_) => {
                let claims: RefreshClaims = serde_json::from_value(payload)?;
                let wired = claims.wired.clone();
                Ok((Some(claims), wired))
            }
        }
    }
}
