pub mod deactivate_user;
pub mod error;
pub mod github;
pub mod login;
pub mod refresh_token;
pub mod register;
pub mod update_user;
pub mod user_response;
pub mod verification;

pub use deactivate_user::{DeactivateResponse, deactivate_user};
pub use error::{ApiError, ErrorResponse};
pub use github::{AuthorizationUrlResponse, GithubLoginRequest, github_authorize_url, github_login};
pub use login::{LoginRequest, LoginResponse, login};
pub use refresh_token::{RefreshTokenRequest, RefreshTokenResponse, refresh_token};
pub use register::{RegisterRequest, register};
pub use update_user::{UpdateUserRequest, update_user};
pub use user_response::UserResponse;
pub use verification::{
    ConfirmEmailRequest, ConfirmEmailResponse, RequestVerificationRequest,
    RequestVerificationResponse, request_email_verification, verify_email,
};

use axum::http::{HeaderMap, header};

/// Pull the bearer token out of the Authorization header.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(ApiError::MissingToken)
}
