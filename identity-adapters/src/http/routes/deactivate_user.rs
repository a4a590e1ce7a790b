use axum::{Json, extract::State, http::HeaderMap, response::IntoResponse};
use serde::Serialize;

use identity_application::DeactivateUserUseCase;
use identity_core::{TokenService, UserRepository};

use super::bearer_token;
use super::error::ApiError;

#[derive(Serialize)]
pub struct DeactivateResponse {
    pub deactivated: bool,
}

#[tracing::instrument(name = "Deactivate user", skip_all)]
pub async fn deactivate_user<R, T>(
    State((users, tokens)): State<(R, T)>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError>
where
    R: UserRepository + Clone + 'static,
    T: TokenService + Clone + 'static,
{
    let token = bearer_token(&headers)?;
    let use_case = DeactivateUserUseCase::new(&users, &tokens);

    let deactivated = use_case.execute(token).await?;
    Ok(Json(DeactivateResponse { deactivated }))
}
