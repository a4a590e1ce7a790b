use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

static LOGIN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{3,}$").expect("login pattern must compile"));

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern must compile"));

const MIN_PASSWORD_LENGTH: usize = 8;

/// Opaque, server-generated user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(value: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(value).map(Self)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for UserId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Registration candidate carrying the raw password.
///
/// Validation aggregates every violated rule instead of failing on the first,
/// so callers can report them all at once. The order is fixed: login, email,
/// password.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub login: String,
    pub email: String,
    pub password: Secret<String>,
}

impl NewUser {
    pub fn new(login: String, email: String, password: Secret<String>) -> Self {
        Self {
            login,
            email,
            password,
        }
    }

    pub fn is_valid_login(&self) -> bool {
        LOGIN_PATTERN.is_match(&self.login)
    }

    pub fn is_valid_email(&self) -> bool {
        EMAIL_PATTERN.is_match(&self.email)
    }

    pub fn is_valid_password(&self) -> bool {
        let password = self.password.expose_secret();
        password.len() >= MIN_PASSWORD_LENGTH
            && password.chars().any(|c| c.is_ascii_uppercase())
            && password.chars().any(|c| c.is_ascii_digit())
    }

    pub fn is_valid(&self) -> bool {
        self.validation_errors().is_empty()
    }

    pub fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !self.is_valid_login() {
            errors.push(String::from(
                "login must be at least 3 characters of letters, digits or underscores",
            ));
        }
        if !self.is_valid_email() {
            errors.push(String::from("email must be a valid email address"));
        }
        if !self.is_valid_password() {
            errors.push(String::from(
                "password must be at least 8 characters and contain an uppercase letter and a digit",
            ));
        }
        errors
    }
}

/// A durable user record.
///
/// `login`, `email` and `github_id` are each globally unique. Users are never
/// physically deleted; deactivation flips `is_active`.
#[derive(Debug, Clone)]
pub struct User {
    id: UserId,
    login: String,
    email: String,
    password_hash: Secret<String>,
    is_active: bool,
    is_email_verified: bool,
    github_id: Option<String>,
}

impl User {
    /// A user created through local registration.
    pub fn local(login: String, email: String, password_hash: Secret<String>) -> Self {
        Self {
            id: UserId::new(),
            login,
            email,
            password_hash,
            is_active: true,
            is_email_verified: false,
            github_id: None,
        }
    }

    /// A user provisioned from a first-time GitHub login. The GitHub id is
    /// set exactly once, here.
    pub fn federated(
        login: String,
        email: String,
        password_hash: Secret<String>,
        github_id: String,
    ) -> Self {
        Self {
            id: UserId::new(),
            login,
            email,
            password_hash,
            is_active: true,
            is_email_verified: false,
            github_id: Some(github_id),
        }
    }

    /// Reconstruct a user from stored fields.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: UserId,
        login: String,
        email: String,
        password_hash: Secret<String>,
        is_active: bool,
        is_email_verified: bool,
        github_id: Option<String>,
    ) -> Self {
        Self {
            id,
            login,
            email,
            password_hash,
            is_active,
            is_email_verified,
            github_id,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &Secret<String> {
        &self.password_hash
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_email_verified(&self) -> bool {
        self.is_email_verified
    }

    pub fn github_id(&self) -> Option<&str> {
        self.github_id.as_deref()
    }

    pub fn set_email(&mut self, email: String) {
        self.email = email;
    }

    pub fn set_password_hash(&mut self, password_hash: Secret<String>) {
        self.password_hash = password_hash;
    }

    pub fn set_email_verified(&mut self, verified: bool) {
        self.is_email_verified = verified;
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }
}
