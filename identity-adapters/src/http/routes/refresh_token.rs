use axum::{Json, extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};

use identity_application::RefreshTokenUseCase;
use identity_core::TokenService;

use super::error::ApiError;

#[derive(Deserialize)]
pub struct RefreshTokenRequest {
    pub token: String,
}

#[derive(Serialize)]
pub struct RefreshTokenResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
}

#[tracing::instrument(name = "Refresh token", skip_all)]
pub async fn refresh_token<T>(
    State(tokens): State<T>,
    Json(request): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    T: TokenService + Clone + 'static,
{
    let use_case = RefreshTokenUseCase::new(&tokens);
    let access_token = use_case.execute(&request.token).await?;

    Ok(Json(RefreshTokenResponse { access_token }))
}
