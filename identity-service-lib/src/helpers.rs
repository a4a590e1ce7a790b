use secrecy::ExposeSecret;
use sqlx::{PgPool, postgres::PgPoolOptions};

use identity_adapters::config::PostgresSettings;

/// Configure and return a PostgreSQL connection pool
///
/// Creates a connection pool from the configured URL and runs all pending
/// migrations.
///
/// # Panics
/// Panics if unable to create the pool or run migrations
pub async fn configure_postgresql(settings: &PostgresSettings) -> PgPool {
    let pg_pool = get_postgres_pool(settings.url.expose_secret())
        .await
        .expect("Failed to create Postgres connection pool");

    // Run database migrations
    sqlx::migrate!("../identity-service-bin/migrations")
        .run(&pg_pool)
        .await
        .expect("Failed to run migrations");

    pg_pool
}

/// Create a PostgreSQL connection pool
pub async fn get_postgres_pool(url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new().max_connections(5).connect(url).await
}
