use secrecy::Secret;
use uuid::Uuid;

use identity_core::{
    EmailClient, GithubOAuthError, GithubOAuthProvider, GithubProfile, LoginResult, NewUser,
    PasswordHashError, PasswordHasher, TokenError, TokenService, User, UserRepository,
    UserRepositoryError,
};

/// Ceiling on login-candidate probes during federated provisioning.
pub const LOGIN_GENERATION_LIMIT: u32 = 1000;

/// Error types for the GitHub login use case
#[derive(Debug, thiserror::Error)]
pub enum GithubLoginError {
    #[error("github profile is missing a required {0} field")]
    MissingProfileField(&'static str),
    #[error("invalid provisioned user: {}", .0.join("; "))]
    InvalidUser(Vec<String>),
    #[error("user account is deactivated")]
    AccountDeactivated,
    #[error("could not find a free login within {LOGIN_GENERATION_LIMIT} candidates")]
    LoginGenerationExhausted,
    #[error("user already exists")]
    UserAlreadyExists,
    #[error("github oauth error: {0}")]
    OAuth(#[from] GithubOAuthError),
    #[error("token error: {0}")]
    Token(#[from] TokenError),
    #[error("password hashing error: {0}")]
    Hasher(#[from] PasswordHashError),
    #[error("user repository error: {0}")]
    Repository(UserRepositoryError),
}

impl From<UserRepositoryError> for GithubLoginError {
    fn from(error: UserRepositoryError) -> Self {
        match error {
            UserRepositoryError::AlreadyExists => Self::UserAlreadyExists,
            other => Self::Repository(other),
        }
    }
}

/// GitHub login use case - exchanges an OAuth code for a profile and signs
/// the user in, provisioning an account on first login.
pub struct GithubLoginUseCase<'a, R, P, H, T, E>
where
    R: UserRepository,
    P: GithubOAuthProvider,
    H: PasswordHasher,
    T: TokenService,
    E: EmailClient,
{
    users: &'a R,
    provider: &'a P,
    password_hasher: &'a H,
    tokens: &'a T,
    email_client: &'a E,
}

impl<'a, R, P, H, T, E> GithubLoginUseCase<'a, R, P, H, T, E>
where
    R: UserRepository,
    P: GithubOAuthProvider,
    H: PasswordHasher,
    T: TokenService,
    E: EmailClient,
{
    pub fn new(
        users: &'a R,
        provider: &'a P,
        password_hasher: &'a H,
        tokens: &'a T,
        email_client: &'a E,
    ) -> Self {
        Self {
            users,
            provider,
            password_hasher,
            tokens,
            email_client,
        }
    }

    #[tracing::instrument(name = "GithubLoginUseCase::execute", skip_all)]
    pub async fn execute(&self, code: &str) -> Result<LoginResult, GithubLoginError> {
        let profile = self.provider.fetch_profile(code).await?;

        if profile.id.is_empty() {
            return Err(GithubLoginError::MissingProfileField("id"));
        }
        let email = profile
            .email
            .clone()
            .ok_or(GithubLoginError::MissingProfileField("email"))?;

        let user = match self.users.find_by_github_id(&profile.id).await? {
            Some(user) => user,
            None => self.provision(&profile, email).await?,
        };

        if !user.is_active() {
            return Err(GithubLoginError::AccountDeactivated);
        }

        let access_token = self.tokens.generate_token(user.id())?;
        Ok(LoginResult::new(user, access_token))
    }

    /// Create a user for a first-time federated login.
    ///
    /// The placeholder credential is random and never disclosed, so password
    /// login stays unusable for federated accounts; it still has to satisfy
    /// the password rules because the candidate passes the same validation
    /// as local registration.
    async fn provision(
        &self,
        profile: &GithubProfile,
        email: String,
    ) -> Result<User, GithubLoginError> {
        let login = self.free_login(&profile.login).await?;
        let candidate = NewUser::new(login, email, placeholder_password());

        let errors = candidate.validation_errors();
        if !errors.is_empty() {
            return Err(GithubLoginError::InvalidUser(errors));
        }

        let password_hash = self.password_hasher.hash(&candidate.password).await?;
        let user = User::federated(
            candidate.login,
            candidate.email,
            password_hash,
            profile.id.clone(),
        );
        let user = self.users.save(user).await?;
        tracing::info!(login = %user.login(), "provisioned user from github profile");

        if !self
            .email_client
            .send_welcome(user.email(), &profile.display_name)
            .await
        {
            tracing::warn!(email = %user.email(), "welcome email was not delivered");
        }

        Ok(user)
    }

    /// Probe `desired`, then `desired1`, `desired2`, ... until a login is
    /// free, re-checking the repository each time.
    async fn free_login(&self, desired: &str) -> Result<String, GithubLoginError> {
        for attempt in 0..LOGIN_GENERATION_LIMIT {
            let candidate = if attempt == 0 {
                desired.to_string()
            } else {
                format!("{desired}{attempt}")
            };
            if self.users.find_by_login(&candidate).await?.is_none() {
                return Ok(candidate);
            }
        }
        Err(GithubLoginError::LoginGenerationExhausted)
    }
}

fn placeholder_password() -> Secret<String> {
    Secret::from(format!("A1{}", Uuid::new_v4().simple()))
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::test_support::{
        CannedGithub, InMemoryUsers, PlainHasher, RecordingEmailClient, StaticTokens,
    };

    fn profile(id: &str, login: &str, email: Option<&str>) -> GithubProfile {
        GithubProfile {
            id: id.to_string(),
            login: login.to_string(),
            email: email.map(str::to_string),
            display_name: login.to_string(),
        }
    }

    #[tokio::test]
    async fn first_login_provisions_a_user() {
        let users = InMemoryUsers::default();
        let provider = CannedGithub::single(profile("42", "bob", Some("bob@example.com")));
        let email_client = RecordingEmailClient::default();
        let use_case = GithubLoginUseCase::new(
            &users,
            &provider,
            &PlainHasher,
            &StaticTokens,
            &email_client,
        );

        let result = use_case.execute("oauth-code").await.unwrap();
        assert_eq!(result.user.login(), "bob");
        assert_eq!(result.user.github_id(), Some("42"));
        assert!(!result.access_token.is_empty());
        assert_eq!(users.count().await, 1);
    }

    #[tokio::test]
    async fn second_login_reuses_the_existing_user() {
        let users = InMemoryUsers::default();
        let provider = CannedGithub::new(vec![
            profile("42", "bob", Some("bob@example.com")),
            profile("42", "bob", Some("bob@example.com")),
        ]);
        let email_client = RecordingEmailClient::default();
        let use_case = GithubLoginUseCase::new(
            &users,
            &provider,
            &PlainHasher,
            &StaticTokens,
            &email_client,
        );

        let first = use_case.execute("code-1").await.unwrap();
        let second = use_case.execute("code-2").await.unwrap();
        assert_eq!(first.user.id(), second.user.id());
        assert_eq!(users.count().await, 1);
    }

    #[tokio::test]
    async fn colliding_logins_get_numeric_suffixes() {
        let users = InMemoryUsers::default();
        let provider = CannedGithub::new(vec![
            profile("1", "bob", Some("bob1@example.com")),
            profile("2", "bob", Some("bob2@example.com")),
            profile("3", "bob", Some("bob3@example.com")),
        ]);
        let email_client = RecordingEmailClient::default();
        let use_case = GithubLoginUseCase::new(
            &users,
            &provider,
            &PlainHasher,
            &StaticTokens,
            &email_client,
        );

        let logins = [
            use_case.execute("a").await.unwrap().user.login().to_string(),
            use_case.execute("b").await.unwrap().user.login().to_string(),
            use_case.execute("c").await.unwrap().user.login().to_string(),
        ];
        assert_eq!(logins, ["bob", "bob1", "bob2"]);
    }

    #[tokio::test]
    async fn missing_email_creates_no_user() {
        let users = InMemoryUsers::default();
        let provider = CannedGithub::single(profile("42", "bob", None));
        let email_client = RecordingEmailClient::default();
        let use_case = GithubLoginUseCase::new(
            &users,
            &provider,
            &PlainHasher,
            &StaticTokens,
            &email_client,
        );

        let result = use_case.execute("code").await;
        assert!(matches!(
            result,
            Err(GithubLoginError::MissingProfileField("email"))
        ));
        assert_eq!(users.count().await, 0);
    }

    #[tokio::test]
    async fn missing_id_creates_no_user() {
        let users = InMemoryUsers::default();
        let provider = CannedGithub::single(profile("", "bob", Some("bob@example.com")));
        let email_client = RecordingEmailClient::default();
        let use_case = GithubLoginUseCase::new(
            &users,
            &provider,
            &PlainHasher,
            &StaticTokens,
            &email_client,
        );

        let result = use_case.execute("code").await;
        assert!(matches!(
            result,
            Err(GithubLoginError::MissingProfileField("id"))
        ));
        assert_eq!(users.count().await, 0);
    }

    #[tokio::test]
    async fn deactivated_account_cannot_log_in_via_oauth() {
        let users = InMemoryUsers::default();
        let mut user = User::federated(
            "bob".to_string(),
            "bob@example.com".to_string(),
            Secret::from("hashed:unused".to_string()),
            "42".to_string(),
        );
        user.deactivate();
        users.insert(user).await;

        let provider = CannedGithub::single(profile("42", "bob", Some("bob@example.com")));
        let email_client = RecordingEmailClient::default();
        let use_case = GithubLoginUseCase::new(
            &users,
            &provider,
            &PlainHasher,
            &StaticTokens,
            &email_client,
        );

        let result = use_case.execute("code").await;
        assert!(matches!(result, Err(GithubLoginError::AccountDeactivated)));
    }

    /// Repository whose every login is taken.
    struct SaturatedUsers {
        inner: InMemoryUsers,
    }

    #[async_trait]
    impl UserRepository for SaturatedUsers {
        async fn find_by_id(
            &self,
            id: &identity_core::UserId,
        ) -> Result<Option<User>, UserRepositoryError> {
            self.inner.find_by_id(id).await
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserRepositoryError> {
            self.inner.find_by_email(email).await
        }

        async fn find_by_login(&self, login: &str) -> Result<Option<User>, UserRepositoryError> {
            Ok(Some(User::local(
                login.to_string(),
                format!("{login}@taken.example.com"),
                Secret::from("hashed:unused".to_string()),
            )))
        }

        async fn find_by_github_id(
            &self,
            github_id: &str,
        ) -> Result<Option<User>, UserRepositoryError> {
            self.inner.find_by_github_id(github_id).await
        }

        async fn save(&self, user: User) -> Result<User, UserRepositoryError> {
            self.inner.save(user).await
        }

        async fn update(
            &self,
            id: &identity_core::UserId,
            patch: identity_core::UserPatch,
        ) -> Result<User, UserRepositoryError> {
            self.inner.update(id, patch).await
        }

        async fn deactivate(
            &self,
            id: &identity_core::UserId,
        ) -> Result<bool, UserRepositoryError> {
            self.inner.deactivate(id).await
        }
    }

    #[tokio::test]
    async fn exhausted_login_namespace_is_an_error() {
        let users = SaturatedUsers {
            inner: InMemoryUsers::default(),
        };
        let provider = CannedGithub::single(profile("42", "bob", Some("bob@example.com")));
        let email_client = RecordingEmailClient::default();
        let use_case = GithubLoginUseCase::new(
            &users,
            &provider,
            &PlainHasher,
            &StaticTokens,
            &email_client,
        );

        let result = use_case.execute("code").await;
        assert!(matches!(
            result,
            Err(GithubLoginError::LoginGenerationExhausted)
        ));
    }

    #[tokio::test]
    async fn provisioned_login_must_pass_the_domain_rules() {
        let users = InMemoryUsers::default();
        // GitHub allows hyphens in logins; the local rules do not.
        let provider = CannedGithub::single(profile("42", "bob-dev", Some("bob@example.com")));
        let email_client = RecordingEmailClient::default();
        let use_case = GithubLoginUseCase::new(
            &users,
            &provider,
            &PlainHasher,
            &StaticTokens,
            &email_client,
        );

        let result = use_case.execute("code").await;
        assert!(matches!(result, Err(GithubLoginError::InvalidUser(_))));
        assert_eq!(users.count().await, 0);
    }
}
