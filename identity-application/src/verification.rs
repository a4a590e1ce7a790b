use chrono::{Duration, Utc};

use identity_core::{EmailClient, VerificationCode, VerificationCodeStore, VerificationStoreError};

/// Rolling window used to cap verification-code sends.
const THROTTLE_WINDOW_MINUTES: i64 = 60;

/// Abuse-rate thresholds for verification-code sends. Both values come from
/// deployment configuration; there is no built-in default.
#[derive(Debug, Clone)]
pub struct VerificationPolicy {
    pub max_sends_per_hour: u32,
    pub resend_delay: Duration,
}

/// Error types for the email verification orchestrator
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("verification code email could not be delivered")]
    Dispatch,
    #[error("verification store error: {0}")]
    Store(#[from] VerificationStoreError),
}

/// Email verification orchestrator - applies the send-rate policy, generates
/// and stores codes, and delegates dispatch.
///
/// Verification state on the user record is owned by the caller; this
/// component never mutates users.
pub struct EmailVerificationService<'a, S, E>
where
    S: VerificationCodeStore,
    E: EmailClient,
{
    codes: &'a S,
    email_client: &'a E,
    policy: VerificationPolicy,
}

impl<'a, S, E> EmailVerificationService<'a, S, E>
where
    S: VerificationCodeStore,
    E: EmailClient,
{
    pub fn new(codes: &'a S, email_client: &'a E, policy: VerificationPolicy) -> Self {
        Self {
            codes,
            email_client,
            policy,
        }
    }

    /// The throttle decision alone, exposed for UI-level pre-checks.
    ///
    /// A send is allowed when fewer than `max_sends_per_hour` codes went out
    /// in the trailing hour AND the resend delay has elapsed since the last
    /// send. No prior send counts as elapsed.
    pub async fn can_resend_code(&self, email: &str) -> Result<bool, VerificationError> {
        let window = Duration::minutes(THROTTLE_WINDOW_MINUTES);
        let recent = self.codes.count_recent_sends(email, window).await?;
        if recent >= self.policy.max_sends_per_hour {
            return Ok(false);
        }

        match self.codes.last_sent_at(email).await? {
            Some(last_sent) => Ok(Utc::now() - last_sent >= self.policy.resend_delay),
            None => Ok(true),
        }
    }

    /// Generate, store and dispatch a fresh code.
    ///
    /// Returns `Ok(false)` when throttled - nothing is stored or dispatched.
    /// A dispatch failure after the upsert is a hard error: the code is
    /// already persisted and an undelivered code is a correctness problem.
    #[tracing::instrument(name = "EmailVerificationService::send_verification_code", skip(self))]
    pub async fn send_verification_code(&self, email: &str) -> Result<bool, VerificationError> {
        if !self.can_resend_code(email).await? {
            tracing::debug!(email, "verification code send throttled");
            return Ok(false);
        }

        let code = VerificationCode::generate();
        let expires_at = VerificationCode::expiry_from(Utc::now());
        self.codes.save_code(email, code.as_str(), expires_at).await?;

        if !self
            .email_client
            .send_verification_code(email, code.as_str())
            .await
        {
            return Err(VerificationError::Dispatch);
        }

        Ok(true)
    }

    /// Check a candidate code. Unknown, expired and mismatched codes all
    /// come back as `Ok(false)`; the caller cannot tell which. A match
    /// consumes the stored code.
    #[tracing::instrument(name = "EmailVerificationService::verify_code", skip(self, code))]
    pub async fn verify_code(&self, email: &str, code: &str) -> Result<bool, VerificationError> {
        let Some(stored) = self.codes.find_code(email).await? else {
            return Ok(false);
        };

        if stored.is_expired(Utc::now()) {
            return Ok(false);
        }

        if !stored.matches(code) {
            self.codes.increment_attempts(email).await?;
            return Ok(false);
        }

        self.codes.delete_code(email).await?;
        Ok(true)
    }
}
