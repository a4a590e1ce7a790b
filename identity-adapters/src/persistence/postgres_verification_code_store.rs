use chrono::{DateTime, Duration, Utc};
use sqlx::{PgPool, Row};

use identity_core::{StoredVerificationCode, VerificationCodeStore, VerificationStoreError};

/// Postgres-backed verification code store.
///
/// The outstanding code lives in `email_verification_codes` (one row per
/// email, upsert on conflict); each send is also appended to
/// `email_verification_sends`, which backs the throttle window and outlives
/// the code row.
#[derive(Clone)]
pub struct PostgresVerificationCodeStore {
    pool: PgPool,
}

impl PostgresVerificationCodeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn unexpected(error: sqlx::Error) -> VerificationStoreError {
    VerificationStoreError::Unexpected(error.to_string())
}

#[async_trait::async_trait]
impl VerificationCodeStore for PostgresVerificationCodeStore {
    #[tracing::instrument(name = "Upserting verification code in PostgreSQL", skip_all)]
    async fn save_code(
        &self,
        email: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), VerificationStoreError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        sqlx::query(
            r#"
                INSERT INTO email_verification_codes (email, code, expires_at, attempts, created_at)
                VALUES ($1, $2, $3, 0, $4)
                ON CONFLICT (email) DO UPDATE
                SET code = EXCLUDED.code,
                    expires_at = EXCLUDED.expires_at,
                    attempts = 0,
                    created_at = EXCLUDED.created_at
            "#,
        )
        .bind(email)
        .bind(code)
        .bind(expires_at)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(unexpected)?;

        sqlx::query("INSERT INTO email_verification_sends (email, sent_at) VALUES ($1, $2)")
            .bind(email)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;

        tx.commit().await.map_err(unexpected)
    }

    #[tracing::instrument(name = "Retrieving verification code from PostgreSQL", skip_all)]
    async fn find_code(
        &self,
        email: &str,
    ) -> Result<Option<StoredVerificationCode>, VerificationStoreError> {
        let row = sqlx::query(
            "SELECT code, expires_at, attempts, created_at FROM email_verification_codes WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(StoredVerificationCode {
            code: row.try_get("code").map_err(unexpected)?,
            expires_at: row.try_get("expires_at").map_err(unexpected)?,
            attempts: row.try_get::<i32, _>("attempts").map_err(unexpected)? as u32,
            created_at: row.try_get("created_at").map_err(unexpected)?,
        }))
    }

    #[tracing::instrument(name = "Incrementing verification attempts in PostgreSQL", skip_all)]
    async fn increment_attempts(&self, email: &str) -> Result<(), VerificationStoreError> {
        sqlx::query(
            "UPDATE email_verification_codes SET attempts = attempts + 1 WHERE email = $1",
        )
        .bind(email)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(())
    }

    #[tracing::instrument(name = "Deleting verification code from PostgreSQL", skip_all)]
    async fn delete_code(&self, email: &str) -> Result<(), VerificationStoreError> {
        sqlx::query("DELETE FROM email_verification_codes WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        Ok(())
    }

    #[tracing::instrument(name = "Counting recent verification sends in PostgreSQL", skip_all)]
    async fn count_recent_sends(
        &self,
        email: &str,
        window: Duration,
    ) -> Result<u32, VerificationStoreError> {
        let since = Utc::now() - window;
        let row = sqlx::query(
            "SELECT COUNT(*) AS sends FROM email_verification_sends WHERE email = $1 AND sent_at >= $2",
        )
        .bind(email)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        let count: i64 = row.try_get("sends").map_err(unexpected)?;
        Ok(count as u32)
    }

    #[tracing::instrument(name = "Reading last verification send from PostgreSQL", skip_all)]
    async fn last_sent_at(
        &self,
        email: &str,
    ) -> Result<Option<DateTime<Utc>>, VerificationStoreError> {
        let row = sqlx::query(
            "SELECT MAX(sent_at) AS last_sent FROM email_verification_sends WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        row.try_get("last_sent").map_err(unexpected)
    }
}
