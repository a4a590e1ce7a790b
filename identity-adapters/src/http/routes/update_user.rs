use axum::{Json, extract::State, http::HeaderMap, response::IntoResponse};
use secrecy::Secret;
use serde::Deserialize;

use identity_application::{UpdateUserUseCase, UserUpdate};
use identity_core::{PasswordHasher, TokenService, UserRepository};

use super::bearer_token;
use super::error::ApiError;
use super::user_response::UserResponse;

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<Secret<String>>,
}

#[tracing::instrument(name = "Update user", skip_all)]
pub async fn update_user<R, H, T>(
    State((users, password_hasher, tokens)): State<(R, H, T)>,
    headers: HeaderMap,
    Json(request): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    R: UserRepository + Clone + 'static,
    H: PasswordHasher + Clone + 'static,
    T: TokenService + Clone + 'static,
{
    let token = bearer_token(&headers)?;
    let use_case = UpdateUserUseCase::new(&users, &password_hasher, &tokens);

    let update = UserUpdate {
        email: request.email,
        password: request.password,
    };
    let user = use_case.execute(token, update).await?;

    Ok(Json(UserResponse::from(&user)))
}
