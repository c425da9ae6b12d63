/*
 * Responsibility
 * - key / engine の名前付きレジストリ
 * - (name, MiddlewareConfig) の一覧を名前順に保持 (評価順が決定的になる)
 * - 起動時に 1 度だけ組み立て、AppState 経由で明示的に渡す (グローバルは持たない)
 */
use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use crate::services::auth::engine::TokenDecoder;
use crate::services::auth::key::Key;
use crate::services::auth::middleware_config::MiddlewareConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("middleware {middleware:?} refers to unknown engine {engine:?}")]
    UnknownEngine { middleware: String, engine: String },
}

#[derive(Debug, Default)]
pub struct StatelessAuthConfig {
    keys: BTreeMap<String, Key>,
    engines: BTreeMap<String, Arc<dyn TokenDecoder>>,
    middlewares: Vec<(String, MiddlewareConfig)>,
}

impl StatelessAuthConfig {
    /// Every middleware entry must name a registered engine.
    pub fn new(
        keys: BTreeMap<String, Key>,
        engines: BTreeMap<String, Arc<dyn TokenDecoder>>,
        middlewares: BTreeMap<String, MiddlewareConfig>,
    ) -> Result<Self, RegistryError> {
        for (name, cfg) in &middlewares {
            if !engines.contains_key(&cfg.engine) {
                return Err(RegistryError::UnknownEngine {
                    middleware: name.clone(),
                    engine: cfg.engine.clone(),
                });
            }
        }

        // BTreeMap iterates in key order
        let middlewares = middlewares.into_iter().collect();

        Ok(Self {
            keys,
            engines,
            middlewares,
        })
    }

    pub fn get_key(&self, name: &str) -> Option<&Key> {
        self.keys.get(name)
    }

    pub fn get_engine(&self, name: &str) -> Option<&Arc<dyn TokenDecoder>> {
        self.engines.get(name)
    }

    pub fn middlewares(&self) -> &[(String, MiddlewareConfig)] {
        &self.middlewares
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::PermissionWire;
    use crate::services::auth::engine::AuthEngine;

    fn engines() -> BTreeMap<String, Arc<dyn TokenDecoder>> {
        let engine: Arc<dyn TokenDecoder> =
            Arc::new(AuthEngine::new("default", Key::hmac(b"k"), PermissionWire));
        BTreeMap::from([("default".to_string(), engine)])
    }

    #[test]
    fn lookups_by_name() {
        let config = StatelessAuthConfig::new(
            BTreeMap::from([("nk".to_string(), Key::hmac(b"ckey"))]),
            engines(),
            BTreeMap::new(),
        )
        .unwrap();

        assert!(config.get_key("nk").is_some());
        assert!(config.get_key("ok").is_none());
        assert_eq!(
            config.get_engine("default").map(|e| e.engine_name()),
            Some("default")
        );
        assert!(config.get_engine("other").is_none());
        assert!(config.middlewares().is_empty());
    }

    #[test]
    fn middlewares_are_sorted_by_name() {
        let config = StatelessAuthConfig::new(
            BTreeMap::new(),
            engines(),
            BTreeMap::from([
                ("rm".to_string(), MiddlewareConfig::new().field("b")),
                ("am".to_string(), MiddlewareConfig::new().field("a")),
                ("nm".to_string(), MiddlewareConfig::new()),
            ]),
        )
        .unwrap();

        let names: Vec<&str> = config.middlewares().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["am", "nm", "rm"]);
        assert_eq!(config.middlewares()[0].1.field, "a");
    }

    #[test]
    fn unknown_engine_is_rejected() {
        let err = StatelessAuthConfig::new(
            BTreeMap::new(),
            engines(),
            BTreeMap::from([("auth".to_string(), MiddlewareConfig::new().engine("nope"))]),
        )
        .unwrap_err();

        assert_eq!(
            err,
            RegistryError::UnknownEngine {
                middleware: "auth".into(),
                engine: "nope".into()
            }
        );
    }

    #[test]
    fn instances_are_isolated() {
        let a = StatelessAuthConfig::new(BTreeMap::new(), engines(), BTreeMap::new()).unwrap();
        let b = StatelessAuthConfig::default();

        assert!(a.get_engine("default").is_some());
        assert!(b.get_engine("default").is_none());
    }
}
