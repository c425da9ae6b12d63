/**
 * Responsibility
 * - repo が上位に伝える意味の定義
 */
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepoError {
    #[error("username {0:?} is already taken")]
    Conflict(String),
    #[error("username must not be empty")]
    EmptyUsername,
    #[error("password hashing failed: {0}")]
    Hash(String),
}
