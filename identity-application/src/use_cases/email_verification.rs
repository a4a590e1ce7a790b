use identity_core::{
    EmailClient, User, UserPatch, UserRepository, UserRepositoryError, VerificationCodeStore,
    VerificationStoreError,
};

use crate::verification::{EmailVerificationService, VerificationError, VerificationPolicy};

/// Error types for the email verification use case
#[derive(Debug, thiserror::Error)]
pub enum EmailVerificationError {
    #[error("email is not registered")]
    UnknownEmail,
    #[error("email is already verified")]
    AlreadyVerified,
    #[error("verification code email could not be delivered")]
    Dispatch,
    #[error("verification store error: {0}")]
    Store(#[from] VerificationStoreError),
    #[error("user repository error: {0}")]
    Repository(#[from] UserRepositoryError),
}

impl From<VerificationError> for EmailVerificationError {
    fn from(error: VerificationError) -> Self {
        match error {
            VerificationError::Dispatch => Self::Dispatch,
            VerificationError::Store(e) => Self::Store(e),
        }
    }
}

/// Email verification use case - gates the verification flow on an existing,
/// not-yet-verified user and flips the flag once a code checks out.
pub struct EmailVerificationUseCase<'a, R, S, E>
where
    R: UserRepository,
    S: VerificationCodeStore,
    E: EmailClient,
{
    users: &'a R,
    codes: &'a S,
    email_client: &'a E,
    policy: VerificationPolicy,
}

impl<'a, R, S, E> EmailVerificationUseCase<'a, R, S, E>
where
    R: UserRepository,
    S: VerificationCodeStore,
    E: EmailClient,
{
    pub fn new(
        users: &'a R,
        codes: &'a S,
        email_client: &'a E,
        policy: VerificationPolicy,
    ) -> Self {
        Self {
            users,
            codes,
            email_client,
            policy,
        }
    }

    /// Request a verification code. `Ok(false)` means throttled.
    #[tracing::instrument(name = "EmailVerificationUseCase::request", skip(self))]
    pub async fn request(&self, email: &str) -> Result<bool, EmailVerificationError> {
        self.eligible_user(email).await?;
        Ok(self.service().send_verification_code(email).await?)
    }

    /// Check a code and, on a match, mark the user's email verified.
    ///
    /// The flag flip is an independent, idempotent patch so it tolerates
    /// racing with a concurrent profile change.
    #[tracing::instrument(name = "EmailVerificationUseCase::confirm", skip(self, code))]
    pub async fn confirm(&self, email: &str, code: &str) -> Result<bool, EmailVerificationError> {
        let user = self.eligible_user(email).await?;

        if !self.service().verify_code(email, code).await? {
            return Ok(false);
        }

        let patch = UserPatch {
            is_email_verified: Some(true),
            ..UserPatch::default()
        };
        self.users.update(user.id(), patch).await?;
        Ok(true)
    }

    fn service(&self) -> EmailVerificationService<'a, S, E> {
        EmailVerificationService::new(self.codes, self.email_client, self.policy.clone())
    }

    async fn eligible_user(&self, email: &str) -> Result<User, EmailVerificationError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(EmailVerificationError::UnknownEmail)?;
        if user.is_email_verified() {
            return Err(EmailVerificationError::AlreadyVerified);
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use identity_core::User;
    use secrecy::Secret;

    use super::*;
    use crate::test_support::{InMemoryCodes, InMemoryUsers, RecordingEmailClient};

    const EMAIL: &str = "alice@example.com";

    fn policy() -> VerificationPolicy {
        VerificationPolicy {
            max_sends_per_hour: 10,
            resend_delay: Duration::zero(),
        }
    }

    async fn seeded() -> InMemoryUsers {
        let users = InMemoryUsers::default();
        users
            .insert(User::local(
                "alice".to_string(),
                EMAIL.to_string(),
                Secret::from("hashed:Passw0rd".to_string()),
            ))
            .await;
        users
    }

    #[tokio::test]
    async fn request_then_confirm_marks_the_email_verified() {
        let users = seeded().await;
        let codes = InMemoryCodes::default();
        let email_client = RecordingEmailClient::default();
        let use_case = EmailVerificationUseCase::new(&users, &codes, &email_client, policy());

        assert!(use_case.request(EMAIL).await.unwrap());
        let code = email_client.verification_codes(EMAIL).await.remove(0);

        assert!(use_case.confirm(EMAIL, &code).await.unwrap());
        let user = users.find_by_email(EMAIL).await.unwrap().unwrap();
        assert!(user.is_email_verified());
    }

    #[tokio::test]
    async fn wrong_code_does_not_verify() {
        let users = seeded().await;
        let codes = InMemoryCodes::default();
        let email_client = RecordingEmailClient::default();
        let use_case = EmailVerificationUseCase::new(&users, &codes, &email_client, policy());

        use_case.request(EMAIL).await.unwrap();
        assert!(!use_case.confirm(EMAIL, "000000").await.unwrap());

        let user = users.find_by_email(EMAIL).await.unwrap().unwrap();
        assert!(!user.is_email_verified());
    }

    #[tokio::test]
    async fn unknown_email_is_rejected() {
        let users = InMemoryUsers::default();
        let codes = InMemoryCodes::default();
        let email_client = RecordingEmailClient::default();
        let use_case = EmailVerificationUseCase::new(&users, &codes, &email_client, policy());

        let result = use_case.request("nobody@example.com").await;
        assert!(matches!(result, Err(EmailVerificationError::UnknownEmail)));
    }

    #[tokio::test]
    async fn already_verified_email_is_rejected() {
        let users = seeded().await;
        let codes = InMemoryCodes::default();
        let email_client = RecordingEmailClient::default();
        let use_case = EmailVerificationUseCase::new(&users, &codes, &email_client, policy());

        use_case.request(EMAIL).await.unwrap();
        let code = email_client.verification_codes(EMAIL).await.remove(0);
        use_case.confirm(EMAIL, &code).await.unwrap();

        assert!(matches!(
            use_case.request(EMAIL).await,
            Err(EmailVerificationError::AlreadyVerified)
        ));
        assert!(matches!(
            use_case.confirm(EMAIL, &code).await,
            Err(EmailVerificationError::AlreadyVerified)
        ));
    }
}
