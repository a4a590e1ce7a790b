use identity_core::{
    EmailClient, NewUser, PasswordHashError, PasswordHasher, User, UserRepository,
    UserRepositoryError,
};

/// Error types for the register use case
#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("invalid user: {}", .0.join("; "))]
    InvalidUser(Vec<String>),
    #[error("a user with this email already exists")]
    UserAlreadyExists,
    #[error("password hashing error: {0}")]
    Hasher(#[from] PasswordHashError),
    #[error("user repository error: {0}")]
    Repository(UserRepositoryError),
}

impl From<UserRepositoryError> for RegisterError {
    fn from(error: UserRepositoryError) -> Self {
        match error {
            // The storage uniqueness constraint is authoritative; the
            // pre-check below can race with a concurrent registration.
            UserRepositoryError::AlreadyExists => Self::UserAlreadyExists,
            other => Self::Repository(other),
        }
    }
}

/// Register use case - creates a local user from login, email and password.
pub struct RegisterUseCase<'a, R, H, E>
where
    R: UserRepository,
    H: PasswordHasher,
    E: EmailClient,
{
    users: &'a R,
    password_hasher: &'a H,
    email_client: &'a E,
}

impl<'a, R, H, E> RegisterUseCase<'a, R, H, E>
where
    R: UserRepository,
    H: PasswordHasher,
    E: EmailClient,
{
    pub fn new(users: &'a R, password_hasher: &'a H, email_client: &'a E) -> Self {
        Self {
            users,
            password_hasher,
            email_client,
        }
    }

    /// Execute the register use case
    ///
    /// Validation reports every violated rule at once. The welcome email is
    /// best-effort; a failed send is logged, never an error.
    #[tracing::instrument(name = "RegisterUseCase::execute", skip(self, new_user), fields(login = %new_user.login))]
    pub async fn execute(&self, new_user: NewUser) -> Result<User, RegisterError> {
        let errors = new_user.validation_errors();
        if !errors.is_empty() {
            return Err(RegisterError::InvalidUser(errors));
        }

        if self.users.find_by_email(&new_user.email).await?.is_some() {
            return Err(RegisterError::UserAlreadyExists);
        }

        let password_hash = self.password_hasher.hash(&new_user.password).await?;
        let user = User::local(new_user.login, new_user.email, password_hash);
        let user = self.users.save(user).await?;

        if !self
            .email_client
            .send_welcome(user.email(), user.login())
            .await
        {
            tracing::warn!(email = %user.email(), "welcome email was not delivered");
        }

        Ok(user)
    }
}
