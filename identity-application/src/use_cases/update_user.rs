use secrecy::{ExposeSecret, Secret};

use identity_core::{
    PasswordHashError, PasswordHasher, TokenService, User, UserPatch, UserRepository,
    UserRepositoryError,
};

use crate::current_user::{CurrentUserError, resolve_current_user};

/// Updated passwords only need 6 characters; the stricter registration rules
/// do not apply here.
pub const MIN_UPDATED_PASSWORD_LENGTH: usize = 6;

/// Profile changes requested by the token holder.
#[derive(Debug, Default, Clone)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub password: Option<Secret<String>>,
}

/// Error types for the update user use case
#[derive(Debug, thiserror::Error)]
pub enum UpdateUserError {
    #[error(transparent)]
    CurrentUser(#[from] CurrentUserError),
    #[error("a user with this email already exists")]
    UserAlreadyExists,
    #[error("password must be at least {MIN_UPDATED_PASSWORD_LENGTH} characters")]
    PasswordTooShort,
    #[error("password hashing error: {0}")]
    Hasher(#[from] PasswordHashError),
    #[error("user repository error: {0}")]
    Repository(UserRepositoryError),
}

impl From<UserRepositoryError> for UpdateUserError {
    fn from(error: UserRepositoryError) -> Self {
        match error {
            UserRepositoryError::AlreadyExists => Self::UserAlreadyExists,
            other => Self::Repository(other),
        }
    }
}

/// Update user use case - applies a profile patch for the token holder.
pub struct UpdateUserUseCase<'a, R, H, T>
where
    R: UserRepository,
    H: PasswordHasher,
    T: TokenService,
{
    users: &'a R,
    password_hasher: &'a H,
    tokens: &'a T,
}

impl<'a, R, H, T> UpdateUserUseCase<'a, R, H, T>
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

    #[tracing::instrument(name = "UpdateUserUseCase::execute", skip_all)]
    pub async fn execute(&self, token: &str, update: UserUpdate) -> Result<User, UpdateUserError> {
        let user = resolve_current_user(token, self.tokens, self.users).await?;

        let mut patch = UserPatch::default();

        if let Some(email) = update.email {
            if email != user.email() && self.users.find_by_email(&email).await?.is_some() {
                return Err(UpdateUserError::UserAlreadyExists);
            }
            patch.email = Some(email);
        }

        if let Some(password) = update.password {
            if password.expose_secret().len() < MIN_UPDATED_PASSWORD_LENGTH {
                return Err(UpdateUserError::PasswordTooShort);
            }
            patch.password_hash = Some(self.password_hasher.hash(&password).await?);
        }

        Ok(self.users.update(user.id(), patch).await?)
    }
}
