/*
 * Responsibility
 * - Handler から見える認証コンテキストの型
 * - middleware が field 名ごとに decode 結果を格納し、handler は型を指定して取り出す
 *
 * Notes
 * - field は設定 (MiddlewareConfig.field) で決まるため、名前 -> 値の map で持つ
 * - 値の型は engine ごとに異なるので Any として保持し、get::<T> で downcast する
 */
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::services::auth::Identity;

/// Identities decoded for one request, keyed by middleware field name.
///
/// A field that was evaluated but had no token is present with `None`; a field
/// no middleware entry wrote is absent altogether.
#[derive(Clone, Default)]
pub struct AuthContext {
    fields: BTreeMap<String, Option<Identity>>,
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (field, value) in &self.fields {
            map.entry(field, &if value.is_some() { "set" } else { "unset" });
        }
        map.finish()
    }
}

impl AuthContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: impl Into<String>, identity: Option<Identity>) {
        self.fields.insert(field.into(), identity);
    }

    /// True if some middleware entry wrote this field (even with `None`).
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn is_set(&self, field: &str) -> bool {
        matches!(self.fields.get(field), Some(Some(_)))
    }

    /// `None` when the field is unset or holds a different type.
    pub fn get<T: Any>(&self, field: &str) -> Option<&T> {
        self.fields.get(field)?.as_ref()?.downcast_ref::<T>()
    }

    pub fn get_arc<T: Any + Send + Sync>(&self, field: &str) -> Option<Arc<T>> {
        let identity = self.fields.get(field)?.clone()?;
        identity.downcast::<T>().ok()
    }
}
