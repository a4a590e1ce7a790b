use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use secrecy::Secret;
use serde::Deserialize;

use identity_application::RegisterUseCase;
use identity_core::{EmailClient, NewUser, PasswordHasher, UserRepository};

use super::error::ApiError;
use super::user_response::UserResponse;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub login: String,
    pub email: String,
    pub password: Secret<String>,
}

#[tracing::instrument(name = "Register", skip_all)]
pub async fn register<R, H, E>(
    State((users, password_hasher, email_client)): State<(R, H, E)>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    R: UserRepository + Clone + 'static,
    H: PasswordHasher + Clone + 'static,
    E: EmailClient + Clone + 'static,
{
    let use_case = RegisterUseCase::new(&users, &password_hasher, &email_client);

    let new_user = NewUser::new(request.login, request.email, request.password);
    let user = use_case.execute(new_user).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}
