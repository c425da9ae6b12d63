/*
 * Responsibility
 * - token engine と、その周辺 (key / clock / lifecycle / acquire / refresh)
 * - middleware 用のレジストリ (StatelessAuthConfig)
 */
pub mod acquire;
pub mod clock;
pub mod engine;
pub mod key;
pub mod lifecycle;
pub mod middleware_config;
pub mod refresh;
pub mod registry;

pub use acquire::{AcquireResult, CredentialStore, CredentialView, QueryCredentialView};
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{AuthEngine, Identity, TokenDecoder, TokenError};
pub use key::{Key, KeyError, KeyFamily};
pub use lifecycle::{Lifecycle, RefreshPolicy};
pub use middleware_config::{HeaderSpec, HeaderToken, MiddlewareConfig, SchemeMismatch};
pub use refresh::{REFRESH_HEADER, RefreshOutcome};
pub use registry::{RegistryError, StatelessAuthConfig};
