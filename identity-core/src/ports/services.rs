use async_trait::async_trait;
use secrecy::Secret;
use thiserror::Error;

use crate::domain::{github_profile::GithubProfile, user::UserId};

#[derive(Debug, Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordHashError(pub String);

/// Port trait for one-way credential hashing.
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, password: &Secret<String>) -> Result<Secret<String>, PasswordHashError>;
    /// Compare a candidate password against a stored hash. A mismatch is
    /// `Ok(false)`, not an error.
    async fn compare(
        &self,
        password: &Secret<String>,
        hash: &Secret<String>,
    ) -> Result<bool, PasswordHashError>;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    #[error("token is not yet valid")]
    NotYetValid,
    #[error("token is malformed or its signature is invalid")]
    Malformed,
    #[error("failed to issue token: {0}")]
    Issue(String),
}

/// Port trait for bearer-token issuance and validation.
///
/// `verify_token` collapses every failure into `false`; `decode_token` keeps
/// the expired / not-yet-valid / malformed distinction so callers can word
/// user-facing messages. The two must agree: a token `verify_token` rejects
/// never decodes.
pub trait TokenService: Send + Sync {
    fn generate_token(&self, subject: &UserId) -> Result<String, TokenError>;
    fn verify_token(&self, token: &str) -> bool;
    fn decode_token(&self, token: &str) -> Result<UserId, TokenError>;
    fn refresh_token(&self, token: &str) -> Result<String, TokenError>;
}

/// Port trait for outbound notification email. Each send reports
/// provider-level success as a bool; transport failures count as `false`.
#[async_trait]
pub trait EmailClient: Send + Sync {
    async fn send_verification_code(&self, recipient: &str, code: &str) -> bool;
    async fn send_welcome(&self, recipient: &str, display_name: &str) -> bool;
    async fn send_password_reset(&self, recipient: &str, reset_token: &str) -> bool;
}

#[derive(Debug, Error)]
pub enum GithubOAuthError {
    #[error("token exchange failed: {0}")]
    Exchange(String),
    #[error("profile request failed: {0}")]
    Profile(String),
}

/// Port trait for the GitHub authorization-code exchange.
#[async_trait]
pub trait GithubOAuthProvider: Send + Sync {
    async fn fetch_profile(&self, code: &str) -> Result<GithubProfile, GithubOAuthError>;
    fn authorization_url(&self) -> String;
}
