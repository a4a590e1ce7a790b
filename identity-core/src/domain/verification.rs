use std::fmt;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;

/// Verification codes expire 15 minutes after they are generated.
pub const VERIFICATION_CODE_TTL_MINUTES: i64 = 15;

const PASSWORD_RESET_TOKEN_LENGTH: usize = 32;

/// A short numeric code sent to an email address to prove ownership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationCode(String);

impl VerificationCode {
    /// Generate a random six-digit code.
    pub fn generate() -> Self {
        Self(rand::rng().random_range(100_000..1_000_000).to_string())
    }

    /// The expiry timestamp for a code generated at `now`.
    pub fn expiry_from(now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::minutes(VERIFICATION_CODE_TTL_MINUTES)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque token for the password-reset flow. Only the generation primitive
/// exists; no reset flow is orchestrated around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordResetToken(String);

impl PasswordResetToken {
    pub fn generate() -> Self {
        let token: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(PASSWORD_RESET_TOKEN_LENGTH)
            .map(char::from)
            .collect();
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The outstanding verification code for an email address, as persisted by a
/// [`crate::ports::repositories::VerificationCodeStore`]. One per email;
/// saving a new code overwrites the previous one and resets `attempts`.
#[derive(Debug, Clone)]
pub struct StoredVerificationCode {
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
}

impl StoredVerificationCode {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn matches(&self, candidate: &str) -> bool {
        self.code == candidate
    }
}
