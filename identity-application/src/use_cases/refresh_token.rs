use identity_core::{TokenError, TokenService};

/// Error types for the refresh token use case
#[derive(Debug, thiserror::Error)]
pub enum RefreshTokenError {
    #[error("could not refresh token: {0}")]
    Refresh(#[source] TokenError),
}

/// Refresh token use case - re-issues a token for the same subject.
pub struct RefreshTokenUseCase<'a, T>
where
    T: TokenService,
{
    tokens: &'a T,
}

impl<'a, T> RefreshTokenUseCase<'a, T>
where
    T: TokenService,
{
    pub fn new(tokens: &'a T) -> Self {
        Self { tokens }
    }

    #[tracing::instrument(name = "RefreshTokenUseCase::execute", skip_all)]
    pub async fn execute(&self, token: &str) -> Result<String, RefreshTokenError> {
        self.tokens
            .refresh_token(token)
            .map_err(RefreshTokenError::Refresh)
    }
}
