/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 * - Clone 前提で持つ (内部は Arc)
 */
use std::sync::Arc;

use crate::services::auth::StatelessAuthConfig;

#[derive(Clone, Debug)]
pub struct AppState {
    pub auth: Arc<StatelessAuthConfig>,
}

impl AppState {
    pub fn new(auth: Arc<StatelessAuthConfig>) -> Self {
        Self { auth }
    }
}
