use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordVerifier, Version,
    password_hash::{PasswordHasher as _, SaltString, rand_core},
};
use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use identity_core::{PasswordHashError, PasswordHasher};

/// Argon2id cost parameters. Deployment configuration; there is no built-in
/// default and a missing value fails startup.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Argon2Cost {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

#[derive(Debug, Clone)]
pub struct Argon2PasswordHasher {
    cost: Argon2Cost,
}

impl Argon2PasswordHasher {
    pub fn new(cost: Argon2Cost) -> Self {
        Self { cost }
    }
}

fn argon2(cost: Argon2Cost) -> Result<Argon2<'static>, PasswordHashError> {
    let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
        .map_err(|e| PasswordHashError(e.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    #[tracing::instrument(name = "Computing password hash", skip_all)]
    async fn hash(&self, password: &Secret<String>) -> Result<Secret<String>, PasswordHashError> {
        let cost = self.cost;
        let password = password.clone();
        let current_span: tracing::Span = tracing::Span::current();

        tokio::task::spawn_blocking(move || {
            current_span.in_scope(|| {
                let salt: SaltString = SaltString::generate(rand_core::OsRng);
                argon2(cost)?
                    .hash_password(password.expose_secret().as_bytes(), &salt)
                    .map(|hash| Secret::from(hash.to_string()))
                    .map_err(|e| PasswordHashError(e.to_string()))
            })
        })
        .await
        .map_err(|e| PasswordHashError(e.to_string()))?
    }

    #[tracing::instrument(name = "Verifying password hash", skip_all)]
    async fn compare(
        &self,
        password: &Secret<String>,
        hash: &Secret<String>,
    ) -> Result<bool, PasswordHashError> {
        let cost = self.cost;
        let password = password.clone();
        let hash = hash.clone();
        let current_span: tracing::Span = tracing::Span::current();

        tokio::task::spawn_blocking(move || {
            current_span.in_scope(|| {
                let expected = PasswordHash::new(hash.expose_secret())
                    .map_err(|e| PasswordHashError(e.to_string()))?;

                match argon2(cost)?
                    .verify_password(password.expose_secret().as_bytes(), &expected)
                {
                    Ok(()) => Ok(true),
                    Err(argon2::password_hash::Error::Password) => Ok(false),
                    Err(e) => Err(PasswordHashError(e.to_string())),
                }
            })
        })
        .await
        .map_err(|e| PasswordHashError(e.to_string()))?
    }
}
