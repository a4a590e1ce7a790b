use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use identity_application::{
    CurrentUserError, DeactivateUserError, EmailVerificationError, GithubLoginError, LoginError,
    RefreshTokenError, RegisterError, UpdateUserError, VerificationError,
};
use identity_core::{
    GithubOAuthError, PasswordHashError, TokenError, UserRepositoryError, VerificationStoreError,
};

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub details: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("validation failed")]
    ValidationFailed(Vec<String>),

    #[error("user not found")]
    UserNotFound,

    #[error("user already exists")]
    UserAlreadyExists,

    #[error("missing token")]
    MissingToken,

    #[error("authentication failed: {0}")]
    AuthenticationError(String),

    #[error("user account is deactivated")]
    AccountDeactivated,

    #[error("unexpected error: {0}")]
    UnexpectedError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, error_message, details) = match self {
            ApiError::InvalidInput(_) | ApiError::MissingToken => {
                (StatusCode::BAD_REQUEST, self.to_string(), Vec::new())
            }

            ApiError::ValidationFailed(details) => (
                StatusCode::BAD_REQUEST,
                "validation failed".to_string(),
                details,
            ),

            ApiError::UserAlreadyExists => (StatusCode::CONFLICT, self.to_string(), Vec::new()),

            ApiError::UserNotFound => (StatusCode::NOT_FOUND, self.to_string(), Vec::new()),

            ApiError::AuthenticationError(_) | ApiError::AccountDeactivated => {
                (StatusCode::UNAUTHORIZED, self.to_string(), Vec::new())
            }

            ApiError::UnexpectedError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string(), Vec::new())
            }
        };

        let body = Json(ErrorResponse {
            error: error_message,
            details,
        });

        (status_code, body).into_response()
    }
}

impl From<UserRepositoryError> for ApiError {
    fn from(error: UserRepositoryError) -> Self {
        match error {
            UserRepositoryError::AlreadyExists => ApiError::UserAlreadyExists,
            UserRepositoryError::NotFound => ApiError::UserNotFound,
            UserRepositoryError::Unexpected(e) => ApiError::UnexpectedError(e),
        }
    }
}

impl From<VerificationStoreError> for ApiError {
    fn from(error: VerificationStoreError) -> Self {
        ApiError::UnexpectedError(error.to_string())
    }
}

impl From<PasswordHashError> for ApiError {
    fn from(error: PasswordHashError) -> Self {
        ApiError::UnexpectedError(error.to_string())
    }
}

impl From<TokenError> for ApiError {
    fn from(error: TokenError) -> Self {
        match error {
            TokenError::Expired | TokenError::NotYetValid | TokenError::Malformed => {
                ApiError::AuthenticationError(error.to_string())
            }
            TokenError::Issue(e) => ApiError::UnexpectedError(e),
        }
    }
}

impl From<CurrentUserError> for ApiError {
    fn from(error: CurrentUserError) -> Self {
        match error {
            CurrentUserError::InvalidToken(e) => ApiError::AuthenticationError(e.to_string()),
            CurrentUserError::UserNotFound => ApiError::UserNotFound,
            CurrentUserError::Repository(e) => e.into(),
        }
    }
}

impl From<RegisterError> for ApiError {
    fn from(error: RegisterError) -> Self {
        match error {
            RegisterError::InvalidUser(details) => ApiError::ValidationFailed(details),
            RegisterError::UserAlreadyExists => ApiError::UserAlreadyExists,
            RegisterError::Hasher(e) => e.into(),
            RegisterError::Repository(e) => e.into(),
        }
    }
}

impl From<LoginError> for ApiError {
    fn from(error: LoginError) -> Self {
        match error {
            LoginError::UserNotFound => ApiError::UserNotFound,
            LoginError::InvalidCredentials => {
                ApiError::AuthenticationError(error.to_string())
            }
            LoginError::Hasher(e) => e.into(),
            LoginError::Token(e) => e.into(),
            LoginError::Repository(e) => e.into(),
        }
    }
}

impl From<RefreshTokenError> for ApiError {
    fn from(error: RefreshTokenError) -> Self {
        match error {
            RefreshTokenError::Refresh(_) => ApiError::AuthenticationError(error.to_string()),
        }
    }
}

impl From<UpdateUserError> for ApiError {
    fn from(error: UpdateUserError) -> Self {
        match error {
            UpdateUserError::CurrentUser(e) => e.into(),
            UpdateUserError::UserAlreadyExists => ApiError::UserAlreadyExists,
            UpdateUserError::PasswordTooShort => ApiError::InvalidInput(error.to_string()),
            UpdateUserError::Hasher(e) => e.into(),
            UpdateUserError::Repository(e) => e.into(),
        }
    }
}

impl From<DeactivateUserError> for ApiError {
    fn from(error: DeactivateUserError) -> Self {
        match error {
            DeactivateUserError::CurrentUser(e) => e.into(),
            DeactivateUserError::Repository(e) => e.into(),
        }
    }
}

impl From<GithubLoginError> for ApiError {
    fn from(error: GithubLoginError) -> Self {
        match error {
            GithubLoginError::MissingProfileField(_) => ApiError::InvalidInput(error.to_string()),
            GithubLoginError::InvalidUser(details) => ApiError::ValidationFailed(details),
            GithubLoginError::AccountDeactivated => ApiError::AccountDeactivated,
            GithubLoginError::LoginGenerationExhausted => {
                ApiError::UnexpectedError(error.to_string())
            }
            GithubLoginError::UserAlreadyExists => ApiError::UserAlreadyExists,
            GithubLoginError::OAuth(e) => ApiError::UnexpectedError(e.to_string()),
            GithubLoginError::Token(e) => e.into(),
            GithubLoginError::Hasher(e) => e.into(),
            GithubLoginError::Repository(e) => e.into(),
        }
    }
}

impl From<GithubOAuthError> for ApiError {
    fn from(error: GithubOAuthError) -> Self {
        ApiError::UnexpectedError(error.to_string())
    }
}

impl From<EmailVerificationError> for ApiError {
    fn from(error: EmailVerificationError) -> Self {
        match error {
            EmailVerificationError::UnknownEmail | EmailVerificationError::AlreadyVerified => {
                ApiError::InvalidInput(error.to_string())
            }
            EmailVerificationError::Dispatch => ApiError::UnexpectedError(error.to_string()),
            EmailVerificationError::Store(e) => e.into(),
            EmailVerificationError::Repository(e) => e.into(),
        }
    }
}

impl From<VerificationError> for ApiError {
    fn from(error: VerificationError) -> Self {
        match error {
            VerificationError::Dispatch => ApiError::UnexpectedError(error.to_string()),
            VerificationError::Store(e) => e.into(),
        }
    }
}
