use identity_core::{TokenError, TokenService, User, UserRepository, UserRepositoryError};

/// Error types for token-based identity resolution
#[derive(Debug, thiserror::Error)]
pub enum CurrentUserError {
    #[error("invalid token: {0}")]
    InvalidToken(#[source] TokenError),
    #[error("user not found")]
    UserNotFound,
    #[error("user repository error: {0}")]
    Repository(#[from] UserRepositoryError),
}

/// Resolve the user a bearer token acts for: verify + decode the token, then
/// load the record.
///
/// Deliberately does not check `is_active` - each caller decides whether
/// deactivation matters for its operation.
#[tracing::instrument(name = "resolve_current_user", skip_all)]
pub async fn resolve_current_user<T, R>(
    token: &str,
    tokens: &T,
    users: &R,
) -> Result<User, CurrentUserError>
where
    T: TokenService,
    R: UserRepository,
{
    let subject = tokens
        .decode_token(token)
        .map_err(CurrentUserError::InvalidToken)?;

    users
        .find_by_id(&subject)
        .await?
        .ok_or(CurrentUserError::UserNotFound)
}
