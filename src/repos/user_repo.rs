/*
 * Responsibility
 * - 認証情報ストア (in-memory, 起動時に seed から構築)
 * - パスワードは Argon2id の PHC 文字列のみ保持 (salt はユーザーごとにランダム)
 * - UserRecord / GroupRecord / PermissionRecord を実装し、domain への変換元になる
 */
use std::collections::HashMap;

use argon2::{
    Argon2, PasswordHash, PasswordVerifier,
    password_hash::{PasswordHasher, SaltString},
};
use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::auth::{GroupRecord, PermissionRecord, User, UserRecord};
use crate::repos::error::RepoError;
use crate::services::auth::CredentialStore;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PermissionRow {
    pub name: String,
    pub codename: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GroupRow {
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<PermissionRow>,
}

#[derive(Debug, Clone)]
pub struct UserRow {
    pub username: String,
    /// Argon2id PHC string
    pub password_hash: String,
    pub is_staff: bool,
    pub is_active: bool,
    pub is_superuser: bool,
    pub groups: Vec<GroupRow>,
}

/// Seed entry, as found in `AUTH_USERS`.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub groups: Vec<GroupRow>,
}

fn active_by_default() -> bool {
    true
}

impl SeedUser {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            is_staff: false,
            is_active: true,
            is_superuser: false,
            groups: Vec::new(),
        }
    }
}

impl PermissionRecord for PermissionRow {
    fn name(&self) -> &str {
        &self.name
    }

    fn codename(&self) -> &str {
        &self.codename
    }
}

impl GroupRecord for GroupRow {
    type Permission = PermissionRow;

    fn name(&self) -> &str {
        &self.name
    }

    fn permissions(&self) -> &[PermissionRow] {
        &self.permissions
    }
}

impl UserRecord for UserRow {
    type Group = GroupRow;

    fn username(&self) -> &str {
        &self.username
    }

    // stored accounts are never anonymous
    fn is_anonymous(&self) -> bool {
        false
    }

    fn is_staff(&self) -> bool {
        self.is_staff
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn is_superuser(&self) -> bool {
        self.is_superuser
    }

    fn groups(&self) -> &[GroupRow] {
        &self.groups
    }
}

/// Hash a password using Argon2id with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, RepoError> {
    let salt = SaltString::generate(rand::thread_rng());

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| RepoError::Hash(e.to_string()))
}

/// Verify a password against a stored PHC string. A malformed hash never matches.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[derive(Debug, Default)]
pub struct UserRepo {
    users: HashMap<String, UserRow>,
}

impl UserRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: Vec<SeedUser>) -> Result<Self, RepoError> {
        let mut repo = Self::new();
        for user in seed {
            repo.insert(user)?;
        }
        Ok(repo)
    }

    pub fn insert(&mut self, seed: SeedUser) -> Result<(), RepoError> {
        if seed.username.is_empty() {
            return Err(RepoError::EmptyUsername);
        }
        if self.users.contains_key(&seed.username) {
            return Err(RepoError::Conflict(seed.username));
        }

        let row = UserRow {
            password_hash: hash_password(&seed.password)?,
            username: seed.username.clone(),
            is_staff: seed.is_staff,
            is_active: seed.is_active,
            is_superuser: seed.is_superuser,
            groups: seed.groups,
        };
        self.users.insert(seed.username, row);
        Ok(())
    }

    pub fn get(&self, username: &str) -> Option<&UserRow> {
        self.users.get(username)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl CredentialStore for UserRepo {
    async fn verify_credentials(&self, username: &str, password: &str) -> Option<User> {
        let row = self.get(username)?;
        // inactive accounts cannot log in
        if !row.is_active {
            return None;
        }
        if !verify_password(password, &row.password_hash) {
            return None;
        }
        Some(User::from_record(row))
    }
}
