use axum::{Json, extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};

use identity_application::{EmailVerificationUseCase, VerificationPolicy};
use identity_core::{EmailClient, UserRepository, VerificationCodeStore};

use super::error::ApiError;

#[derive(Deserialize)]
pub struct RequestVerificationRequest {
    pub email: String,
}

#[derive(Serialize, Deserialize)]
pub struct RequestVerificationResponse {
    /// False means throttled - try again later.
    pub sent: bool,
}

#[derive(Deserialize)]
pub struct ConfirmEmailRequest {
    pub email: String,
    pub code: String,
}

#[derive(Serialize, Deserialize)]
pub struct ConfirmEmailResponse {
    pub verified: bool,
}

#[tracing::instrument(name = "Request email verification", skip_all)]
pub async fn request_email_verification<R, S, E>(
    State((users, codes, email_client, policy)): State<(R, S, E, VerificationPolicy)>,
    Json(request): Json<RequestVerificationRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    R: UserRepository + Clone + 'static,
    S: VerificationCodeStore + Clone + 'static,
    E: EmailClient + Clone + 'static,
{
    let use_case = EmailVerificationUseCase::new(&users, &codes, &email_client, policy);

    let sent = use_case.request(&request.email).await?;
    Ok(Json(RequestVerificationResponse { sent }))
}

#[tracing::instrument(name = "Verify email", skip_all)]
pub async fn verify_email<R, S, E>(
    State((users, codes, email_client, policy)): State<(R, S, E, VerificationPolicy)>,
    Json(request): Json<ConfirmEmailRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    R: UserRepository + Clone + 'static,
    S: VerificationCodeStore + Clone + 'static,
    E: EmailClient + Clone + 'static,
{
    let use_case = EmailVerificationUseCase::new(&users, &codes, &email_client, policy);

    let verified = use_case.confirm(&request.email, &request.code).await?;
    Ok(Json(ConfirmEmailResponse { verified }))
}
