//! In-memory collaborators shared across use-case tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, Secret};
use tokio::sync::{Mutex, RwLock};

use identity_core::{
    EmailClient, GithubOAuthError, GithubOAuthProvider, GithubProfile, PasswordHashError,
    PasswordHasher, StoredVerificationCode, TokenError, TokenService, User, UserId, UserPatch,
    UserRepository, UserRepositoryError, VerificationCodeStore, VerificationStoreError,
};

#[derive(Default, Clone)]
pub struct InMemoryUsers {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUsers {
    pub async fn insert(&self, user: User) -> User {
        self.users.write().await.insert(*user.id(), user.clone());
        user
    }

    pub async fn count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserRepositoryError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email() == email).cloned())
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, UserRepositoryError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.login() == login).cloned())
    }

    async fn find_by_github_id(
        &self,
        github_id: &str,
    ) -> Result<Option<User>, UserRepositoryError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.github_id() == Some(github_id))
            .cloned())
    }

    async fn save(&self, user: User) -> Result<User, UserRepositoryError> {
        let mut users = self.users.write().await;
        let taken = users.values().any(|existing| {
            existing.login() == user.login()
                || existing.email() == user.email()
                || (user.github_id().is_some() && existing.github_id() == user.github_id())
        });
        if taken {
            return Err(UserRepositoryError::AlreadyExists);
        }
        users.insert(*user.id(), user.clone());
        Ok(user)
    }

    async fn update(&self, id: &UserId, patch: UserPatch) -> Result<User, UserRepositoryError> {
        let mut users = self.users.write().await;
        if let Some(email) = &patch.email {
            let taken = users
                .values()
                .any(|other| other.id() != id && other.email() == email);
            if taken {
                return Err(UserRepositoryError::AlreadyExists);
            }
        }
        let user = users.get_mut(id).ok_or(UserRepositoryError::NotFound)?;
        if let Some(email) = patch.email {
            user.set_email(email);
        }
        if let Some(password_hash) = patch.password_hash {
            user.set_password_hash(password_hash);
        }
        if let Some(verified) = patch.is_email_verified {
            user.set_email_verified(verified);
        }
        Ok(user.clone())
    }

    async fn deactivate(&self, id: &UserId) -> Result<bool, UserRepositoryError> {
        let mut users = self.users.write().await;
        match users.get_mut(id) {
            Some(user) => {
                user.deactivate();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Token service with the real issuer's shape but no cryptography.
pub struct StaticTokens;

impl TokenService for StaticTokens {
    fn generate_token(&self, subject: &UserId) -> Result<String, TokenError> {
        Ok(format!("token-{subject}"))
    }

    fn verify_token(&self, token: &str) -> bool {
        self.decode_token(token).is_ok()
    }

    fn decode_token(&self, token: &str) -> Result<UserId, TokenError> {
        token
            .strip_prefix("token-")
            .and_then(|raw| UserId::parse(raw).ok())
            .ok_or(TokenError::Malformed)
    }

    fn refresh_token(&self, token: &str) -> Result<String, TokenError> {
        let subject = self.decode_token(token)?;
        self.generate_token(&subject)
    }
}

/// Hasher with a visible marker so tests can assert rehashing happened.
pub struct PlainHasher;

#[async_trait]
impl PasswordHasher for PlainHasher {
    async fn hash(&self, password: &Secret<String>) -> Result<Secret<String>, PasswordHashError> {
        Ok(Secret::from(format!("hashed:{}", password.expose_secret())))
    }

    async fn compare(
        &self,
        password: &Secret<String>,
        hash: &Secret<String>,
    ) -> Result<bool, PasswordHashError> {
        Ok(*hash.expose_secret() == format!("hashed:{}", password.expose_secret()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentEmail {
    Verification { email: String, code: String },
    Welcome { email: String },
    PasswordReset { email: String },
}

#[derive(Clone)]
pub struct RecordingEmailClient {
    succeed: bool,
    sent: Arc<Mutex<Vec<SentEmail>>>,
}

impl Default for RecordingEmailClient {
    fn default() -> Self {
        Self {
            succeed: true,
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl RecordingEmailClient {
    pub fn failing() -> Self {
        Self {
            succeed: false,
            ..Self::default()
        }
    }

    pub async fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub async fn verification_codes(&self, recipient: &str) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .filter_map(|entry| match entry {
                SentEmail::Verification { email, code } if email == recipient => {
                    Some(code.clone())
                }
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl EmailClient for RecordingEmailClient {
    async fn send_verification_code(&self, recipient: &str, code: &str) -> bool {
        self.sent.lock().await.push(SentEmail::Verification {
            email: recipient.to_string(),
            code: code.to_string(),
        });
        self.succeed
    }

    async fn send_welcome(&self, recipient: &str, _display_name: &str) -> bool {
        self.sent.lock().await.push(SentEmail::Welcome {
            email: recipient.to_string(),
        });
        self.succeed
    }

    async fn send_password_reset(&self, recipient: &str, _reset_token: &str) -> bool {
        self.sent.lock().await.push(SentEmail::PasswordReset {
            email: recipient.to_string(),
        });
        self.succeed
    }
}

#[derive(Default, Clone)]
pub struct InMemoryCodes {
    codes: Arc<RwLock<HashMap<String, StoredVerificationCode>>>,
    sends: Arc<RwLock<HashMap<String, Vec<DateTime<Utc>>>>>,
}

impl InMemoryCodes {
    pub async fn stored(&self, email: &str) -> Option<StoredVerificationCode> {
        self.codes.read().await.get(email).cloned()
    }

    /// Shift the most recent send into the past, as if `by` had elapsed.
    pub async fn backdate_last_send(&self, email: &str, by: Duration) {
        if let Some(sends) = self.sends.write().await.get_mut(email) {
            if let Some(last) = sends.last_mut() {
                *last -= by;
            }
        }
    }

    /// Expire the outstanding code for `email`.
    pub async fn expire_code(&self, email: &str) {
        if let Some(stored) = self.codes.write().await.get_mut(email) {
            stored.expires_at = Utc::now() - Duration::seconds(1);
        }
    }
}

#[async_trait]
impl VerificationCodeStore for InMemoryCodes {
    async fn save_code(
        &self,
        email: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), VerificationStoreError> {
        let now = Utc::now();
        self.codes.write().await.insert(
            email.to_string(),
            StoredVerificationCode {
                code: code.to_string(),
                expires_at,
                attempts: 0,
                created_at: now,
            },
        );
        self.sends
            .write()
            .await
            .entry(email.to_string())
            .or_default()
            .push(now);
        Ok(())
    }

    async fn find_code(
        &self,
        email: &str,
    ) -> Result<Option<StoredVerificationCode>, VerificationStoreError> {
        Ok(self.codes.read().await.get(email).cloned())
    }

    async fn increment_attempts(&self, email: &str) -> Result<(), VerificationStoreError> {
        if let Some(stored) = self.codes.write().await.get_mut(email) {
            stored.attempts += 1;
        }
        Ok(())
    }

    async fn delete_code(&self, email: &str) -> Result<(), VerificationStoreError> {
        self.codes.write().await.remove(email);
        Ok(())
    }

    async fn count_recent_sends(
        &self,
        email: &str,
        window: Duration,
    ) -> Result<u32, VerificationStoreError> {
        let since = Utc::now() - window;
        let sends = self.sends.read().await;
        let count = sends
            .get(email)
            .map(|timestamps| timestamps.iter().filter(|sent| **sent >= since).count())
            .unwrap_or(0);
        Ok(count as u32)
    }

    async fn last_sent_at(
        &self,
        email: &str,
    ) -> Result<Option<DateTime<Utc>>, VerificationStoreError> {
        let sends = self.sends.read().await;
        Ok(sends.get(email).and_then(|timestamps| timestamps.last().copied()))
    }
}

/// OAuth provider returning a scripted sequence of profiles.
pub struct CannedGithub {
    profiles: Mutex<Vec<GithubProfile>>,
}

impl CannedGithub {
    pub fn new(profiles: Vec<GithubProfile>) -> Self {
        Self {
            profiles: Mutex::new(profiles),
        }
    }

    pub fn single(profile: GithubProfile) -> Self {
        Self::new(vec![profile])
    }
}

#[async_trait]
impl GithubOAuthProvider for CannedGithub {
    async fn fetch_profile(&self, _code: &str) -> Result<GithubProfile, GithubOAuthError> {
        let mut profiles = self.profiles.lock().await;
        if profiles.is_empty() {
            return Err(GithubOAuthError::Exchange("no scripted profile".to_string()));
        }
        Ok(profiles.remove(0))
    }

    fn authorization_url(&self) -> String {
        "https://github.test/login/oauth/authorize".to_string()
    }
}
