use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use secrecy::Secret;
use thiserror::Error;

use crate::domain::{
    user::{User, UserId},
    verification::StoredVerificationCode,
};

// UserRepository port trait and errors
#[derive(Debug, Error)]
pub enum UserRepositoryError {
    #[error("user already exists")]
    AlreadyExists,
    #[error("user not found")]
    NotFound,
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl PartialEq for UserRepositoryError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::AlreadyExists, Self::AlreadyExists) => true,
            (Self::NotFound, Self::NotFound) => true,
            (Self::Unexpected(_), Self::Unexpected(_)) => true,
            _ => false,
        }
    }
}

/// Partial update applied to a stored user. Absent fields are left untouched.
#[derive(Debug, Default, Clone)]
pub struct UserPatch {
    pub email: Option<String>,
    pub password_hash: Option<Secret<String>>,
    pub is_email_verified: Option<bool>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password_hash.is_none() && self.is_email_verified.is_none()
    }
}

/// Persistence boundary for user records.
///
/// Lookups report an absent record as `Ok(None)`, never as an error. The
/// store is the authority on uniqueness: a `save` or `update` that would
/// violate the login/email/github-id constraints fails with `AlreadyExists`
/// even when the caller's own existence check passed moments earlier.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserRepositoryError>;
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, UserRepositoryError>;
    async fn find_by_github_id(
        &self,
        github_id: &str,
    ) -> Result<Option<User>, UserRepositoryError>;
    async fn save(&self, user: User) -> Result<User, UserRepositoryError>;
    async fn update(&self, id: &UserId, patch: UserPatch) -> Result<User, UserRepositoryError>;
    async fn deactivate(&self, id: &UserId) -> Result<bool, UserRepositoryError>;
}

// VerificationCodeStore port trait and errors
#[derive(Debug, Error)]
pub enum VerificationStoreError {
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

/// Persistence boundary for outstanding verification codes and the per-email
/// send log backing the rate-limit window.
#[async_trait]
pub trait VerificationCodeStore: Send + Sync {
    /// Upsert the code for `email`, resetting the attempt counter and
    /// recording a send at the current time.
    async fn save_code(
        &self,
        email: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), VerificationStoreError>;
    async fn find_code(
        &self,
        email: &str,
    ) -> Result<Option<StoredVerificationCode>, VerificationStoreError>;
    async fn increment_attempts(&self, email: &str) -> Result<(), VerificationStoreError>;
    async fn delete_code(&self, email: &str) -> Result<(), VerificationStoreError>;
    /// Number of codes sent to `email` within the trailing `window`.
    async fn count_recent_sends(
        &self,
        email: &str,
        window: Duration,
    ) -> Result<u32, VerificationStoreError>;
    async fn last_sent_at(
        &self,
        email: &str,
    ) -> Result<Option<DateTime<Utc>>, VerificationStoreError>;
}
