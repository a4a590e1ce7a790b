use secrecy::{ExposeSecret, Secret};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use identity_core::{User, UserId, UserPatch, UserRepository, UserRepositoryError};

/// Postgres-backed user repository.
///
/// Uniqueness of login, email and github_id is enforced by unique indexes;
/// a violated constraint on write maps to `AlreadyExists`, which makes the
/// database the authority when two requests race past the orchestrator's
/// existence check.
#[derive(Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str =
    "id, login, email, password_hash, is_active, is_email_verified, github_id";

fn row_to_user(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User::from_parts(
        UserId::from(row.try_get::<Uuid, _>("id")?),
        row.try_get("login")?,
        row.try_get("email")?,
        Secret::from(row.try_get::<String, _>("password_hash")?),
        row.try_get("is_active")?,
        row.try_get("is_email_verified")?,
        row.try_get("github_id")?,
    ))
}

fn unexpected(error: sqlx::Error) -> UserRepositoryError {
    UserRepositoryError::Unexpected(error.to_string())
}

fn write_error(error: sqlx::Error) -> UserRepositoryError {
    if let Some(db_err) = error.as_database_error() {
        if db_err.constraint().is_some() {
            return UserRepositoryError::AlreadyExists;
        }
    }
    UserRepositoryError::Unexpected(error.to_string())
}

#[async_trait::async_trait]
impl UserRepository for PostgresUserStore {
    #[tracing::instrument(name = "Retrieving user by id from PostgreSQL", skip_all)]
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?;

        row.map(|row| row_to_user(&row)).transpose().map_err(unexpected)
    }

    #[tracing::instrument(name = "Retrieving user by email from PostgreSQL", skip_all)]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserRepositoryError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?;

        row.map(|row| row_to_user(&row)).transpose().map_err(unexpected)
    }

    #[tracing::instrument(name = "Retrieving user by login from PostgreSQL", skip_all)]
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, UserRepositoryError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE login = $1"))
            .bind(login)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?;

        row.map(|row| row_to_user(&row)).transpose().map_err(unexpected)
    }

    #[tracing::instrument(name = "Retrieving user by github id from PostgreSQL", skip_all)]
    async fn find_by_github_id(
        &self,
        github_id: &str,
    ) -> Result<Option<User>, UserRepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE github_id = $1"
        ))
        .bind(github_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        row.map(|row| row_to_user(&row)).transpose().map_err(unexpected)
    }

    #[tracing::instrument(name = "Adding user to PostgreSQL", skip_all)]
    async fn save(&self, user: User) -> Result<User, UserRepositoryError> {
        sqlx::query(
            r#"
                INSERT INTO users (id, login, email, password_hash, is_active, is_email_verified, github_id)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id().as_uuid())
        .bind(user.login())
        .bind(user.email())
        .bind(user.password_hash().expose_secret())
        .bind(user.is_active())
        .bind(user.is_email_verified())
        .bind(user.github_id())
        .execute(&self.pool)
        .await
        .map_err(write_error)?;

        Ok(user)
    }

    #[tracing::instrument(name = "Updating user in PostgreSQL", skip_all)]
    async fn update(&self, id: &UserId, patch: UserPatch) -> Result<User, UserRepositoryError> {
        let row = sqlx::query(&format!(
            r#"
                UPDATE users
                SET email = COALESCE($2, email),
                    password_hash = COALESCE($3, password_hash),
                    is_email_verified = COALESCE($4, is_email_verified)
                WHERE id = $1
                RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(id.as_uuid())
        .bind(patch.email)
        .bind(
            patch
                .password_hash
                .as_ref()
                .map(|hash| hash.expose_secret().clone()),
        )
        .bind(patch.is_email_verified)
        .fetch_optional(&self.pool)
        .await
        .map_err(write_error)?;

        let row = row.ok_or(UserRepositoryError::NotFound)?;
        row_to_user(&row).map_err(unexpected)
    }

    #[tracing::instrument(name = "Deactivating user in PostgreSQL", skip_all)]
    async fn deactivate(&self, id: &UserId) -> Result<bool, UserRepositoryError> {
        let result = sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        Ok(result.rows_affected() > 0)
    }
}
