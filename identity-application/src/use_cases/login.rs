use secrecy::Secret;

use identity_core::{
    LoginResult, PasswordHashError, PasswordHasher, TokenError, TokenService, UserRepository,
    UserRepositoryError,
};

/// Error types for the login use case
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("user not found")]
    UserNotFound,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("password hashing error: {0}")]
    Hasher(#[from] PasswordHashError),
    #[error("token error: {0}")]
    Token(#[from] TokenError),
    #[error("user repository error: {0}")]
    Repository(#[from] UserRepositoryError),
}

/// Login use case - authenticates a user by email or login plus password.
pub struct LoginUseCase<'a, R, H, T>
where
    R: UserRepository,
    H: PasswordHasher,
    T: TokenService,
{
    users: &'a R,
    password_hasher: &'a H,
    tokens: &'a T,
}

impl<'a, R, H, T> LoginUseCase<'a, R, H, T>
where
    R: UserRepository,
    H: PasswordHasher,
    T: TokenService,
{
    pub fn new(users: &'a R, password_hasher: &'a H, tokens: &'a T) -> Self {
        Self {
            users,
            password_hasher,
            tokens,
        }
    }

    /// Execute the login use case
    ///
    /// The identifier resolves as an email first, then as a login.
    /// Deactivation is not checked here - only the OAuth path rejects
    /// inactive users at login time.
    #[tracing::instrument(name = "LoginUseCase::execute", skip(self, password))]
    pub async fn execute(
        &self,
        identifier: &str,
        password: &Secret<String>,
    ) -> Result<LoginResult, LoginError> {
        let user = match self.users.find_by_email(identifier).await? {
            Some(user) => user,
            None => self
                .users
                .find_by_login(identifier)
                .await?
                .ok_or(LoginError::UserNotFound)?,
        };

        if !self
            .password_hasher
            .compare(password, user.password_hash())
            .await?
        {
            return Err(LoginError::InvalidCredentials);
        }

        let access_token = self.tokens.generate_token(user.id())?;
        Ok(LoginResult::new(user, access_token))
    }
}
