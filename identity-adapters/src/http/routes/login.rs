use axum::{Json, extract::State, response::IntoResponse};
use secrecy::Secret;
use serde::{Deserialize, Serialize};

use identity_application::LoginUseCase;
use identity_core::{PasswordHasher, TokenService, UserRepository};

use super::error::ApiError;
use super::user_response::UserResponse;

#[derive(Deserialize)]
pub struct LoginRequest {
    /// Email or login name; email wins when both would match.
    pub identifier: String,
    pub password: Secret<String>,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    #[serde(rename = "accessToken")]
    pub access_token: String,
}

#[tracing::instrument(name = "Login", skip_all)]
pub async fn login<R, H, T>(
    State((users, password_hasher, tokens)): State<(R, H, T)>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    R: UserRepository + Clone + 'static,
    H: PasswordHasher + Clone + 'static,
    T: TokenService + Clone + 'static,
{
    let use_case = LoginUseCase::new(&users, &password_hasher, &tokens);

    let result = use_case
        .execute(&request.identifier, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        user: UserResponse::from(&result.user),
        access_token: result.access_token,
    }))
}
