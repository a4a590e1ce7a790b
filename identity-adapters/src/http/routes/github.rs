use axum::{Json, extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};

use identity_application::GithubLoginUseCase;
use identity_core::{
    EmailClient, GithubOAuthProvider, PasswordHasher, TokenService, UserRepository,
};

use super::error::ApiError;
use super::login::LoginResponse;
use super::user_response::UserResponse;

#[derive(Serialize)]
pub struct AuthorizationUrlResponse {
    pub url: String,
}

#[derive(Deserialize)]
pub struct GithubLoginRequest {
    /// GitHub OAuth authorization code.
    pub code: String,
}

#[tracing::instrument(name = "GitHub authorize url", skip_all)]
pub async fn github_authorize_url<P>(
    State(provider): State<P>,
) -> Result<impl IntoResponse, ApiError>
where
    P: GithubOAuthProvider + Clone + 'static,
{
    Ok(Json(AuthorizationUrlResponse {
        url: provider.authorization_url(),
    }))
}

#[tracing::instrument(name = "GitHub login", skip_all)]
pub async fn github_login<R, P, H, T, E>(
    State((users, provider, password_hasher, tokens, email_client)): State<(R, P, H, T, E)>,
    Json(request): Json<GithubLoginRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    R: UserRepository + Clone + 'static,
    P: GithubOAuthProvider + Clone + 'static,
    H: PasswordHasher + Clone + 'static,
    T: TokenService + Clone + 'static,
    E: EmailClient + Clone + 'static,
{
    let use_case =
        GithubLoginUseCase::new(&users, &provider, &password_hasher, &tokens, &email_client);

    let result = use_case.execute(&request.code).await?;

    Ok(Json(LoginResponse {
        user: UserResponse::from(&result.user),
        access_token: result.access_token,
    }))
}
