use std::time::Duration;

use reqwest::Client as HttpClient;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use identity_adapters::{
    auth::{Argon2PasswordHasher, GithubOAuthClient, JwtTokenService},
    config::Settings,
    email::{MockEmailClient, PostmarkEmailClient},
    persistence::{PostgresUserStore, PostgresVerificationCodeStore},
};
use identity_application::VerificationPolicy;
use identity_core::EmailClient;
use identity_service_lib::{IdentityService, configure_postgresql};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    color_eyre::install().expect("Failed to install color_eyre");

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration; missing mandatory values abort startup here.
    dotenvy::dotenv().ok();
    let settings = Settings::load()?;

    // Setup database connection pool and run migrations
    let pg_pool = configure_postgresql(&settings.postgres).await;

    let http_client = HttpClient::builder()
        .timeout(Duration::from_millis(settings.email_client.timeout_ms))
        .build()?;

    // Without a Postmark token, emails are logged instead of sent.
    match settings.email_client.auth_token.clone() {
        Some(auth_token) => {
            let email_client = PostmarkEmailClient::new(
                settings.email_client.base_url.clone(),
                settings.email_client.sender.clone(),
                auth_token,
                http_client.clone(),
            );
            serve(settings, pg_pool, http_client, email_client).await
        }
        None => {
            tracing::warn!("no email auth token configured, using the mock email client");
            serve(settings, pg_pool, http_client, MockEmailClient::new()).await
        }
    }
}

async fn serve<E>(
    settings: Settings,
    pg_pool: PgPool,
    http_client: HttpClient,
    email_client: E,
) -> Result<(), Box<dyn std::error::Error>>
where
    E: EmailClient + Clone + 'static,
{
    let users = PostgresUserStore::new(pg_pool.clone());
    let codes = PostgresVerificationCodeStore::new(pg_pool);

    let password_hasher = Argon2PasswordHasher::new(settings.auth.argon2);
    let tokens = JwtTokenService::new(
        settings.auth.jwt_secret.clone(),
        settings.auth.token_issuer.clone(),
    );
    let github = GithubOAuthClient::new(
        settings.github.client_id.clone(),
        settings.github.client_secret.clone(),
        settings.github.redirect_url.clone(),
        http_client,
    );

    let verification_policy = VerificationPolicy {
        max_sends_per_hour: settings.verification.max_sends_per_hour,
        resend_delay: chrono::Duration::milliseconds(settings.verification.resend_delay_ms),
    };

    let listener =
        TcpListener::bind(format!("{}:{}", settings.server.host, settings.server.port)).await?;

    IdentityService::new(
        users,
        codes,
        password_hasher,
        tokens,
        email_client,
        github,
        verification_policy,
    )
    .run(listener, settings.allowed_origins)
    .await?;

    Ok(())
}
