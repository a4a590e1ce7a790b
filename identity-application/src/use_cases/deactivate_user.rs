use identity_core::{TokenService, UserRepository, UserRepositoryError};

use crate::current_user::{CurrentUserError, resolve_current_user};

/// Error types for the deactivate user use case
#[derive(Debug, thiserror::Error)]
pub enum DeactivateUserError {
    #[error(transparent)]
    CurrentUser(#[from] CurrentUserError),
    #[error("user repository error: {0}")]
    Repository(#[from] UserRepositoryError),
}

/// Deactivate user use case - soft-deactivates the token holder's account.
pub struct DeactivateUserUseCase<'a, R, T>
where
    R: UserRepository,
    T: TokenService,
{
    users: &'a R,
    tokens: &'a T,
}

impl<'a, R, T> DeactivateUserUseCase<'a, R, T>
where
    R: UserRepository,
    T: TokenService,
{
    pub fn new(users: &'a R, tokens: &'a T) -> Self {
        Self { users, tokens }
    }

    #[tracing::instrument(name = "DeactivateUserUseCase::execute", skip_all)]
    pub async fn execute(&self, token: &str) -> Result<bool, DeactivateUserError> {
        let user = resolve_current_user(token, self.tokens, self.users).await?;
        Ok(self.users.deactivate(user.id()).await?)
    }
}

#[cfg(test)]
mod tests {
    use identity_core::{TokenService, User};
    use secrecy::Secret;

    use super::*;
    use crate::test_support::{InMemoryUsers, StaticTokens};

    #[tokio::test]
    async fn deactivation_flips_is_active() {
        let users = InMemoryUsers::default();
        let user = users
            .insert(User::local(
                "alice".to_string(),
                "alice@example.com".to_string(),
                Secret::from("hashed:Passw0rd".to_string()),
            ))
            .await;
        let token = StaticTokens.generate_token(user.id()).unwrap();

        let use_case = DeactivateUserUseCase::new(&users, &StaticTokens);
        assert!(use_case.execute(&token).await.unwrap());

        let stored = users.find_by_id(user.id()).await.unwrap().unwrap();
        assert!(!stored.is_active());
    }

    #[tokio::test]
    async fn invalid_token_is_rejected() {
        let users = InMemoryUsers::default();
        let use_case = DeactivateUserUseCase::new(&users, &StaticTokens);

        let result = use_case.execute("garbage").await;
        assert!(matches!(
            result,
            Err(DeactivateUserError::CurrentUser(
                CurrentUserError::InvalidToken(_)
            ))
        ));
    }
}
