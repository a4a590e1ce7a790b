use axum::http::HeaderValue;
use config::{Config, ConfigError, Environment};
use secrecy::Secret;
use serde::Deserialize;

use crate::auth::Argon2Cost;

/// Process-wide configuration, loaded once at startup and read-only after.
///
/// Security-sensitive values (signing key, Argon2 cost, throttle thresholds,
/// OAuth credentials, database URL) have no defaults: a missing value fails
/// deserialization and therefore startup.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub postgres: PostgresSettings,
    pub auth: AuthSettings,
    pub verification: VerificationSettings,
    pub github: GithubSettings,
    #[serde(default)]
    pub email_client: EmailClientSettings,
    #[serde(default)]
    pub allowed_origins: Option<AllowedOrigins>,
}

impl Settings {
    /// Load settings from `IDENTITY__`-prefixed environment variables,
    /// e.g. `IDENTITY__AUTH__JWT_SECRET`.
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(
                Environment::with_prefix("IDENTITY")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostgresSettings {
    pub url: Secret<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: Secret<String>,
    pub token_issuer: String,
    pub argon2: Argon2Cost,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerificationSettings {
    pub resend_delay_ms: i64,
    pub max_sends_per_hour: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubSettings {
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub redirect_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailClientSettings {
    #[serde(default = "default_email_base_url")]
    pub base_url: String,
    #[serde(default = "default_email_sender")]
    pub sender: String,
    #[serde(default)]
    pub auth_token: Option<Secret<String>>,
    #[serde(default = "default_email_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for EmailClientSettings {
    fn default() -> Self {
        Self {
            base_url: default_email_base_url(),
            sender: default_email_sender(),
            auth_token: None,
            timeout_ms: default_email_timeout_ms(),
        }
    }
}

/// CORS allow-list. Absent means no cross-origin access.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AllowedOrigins(Vec<String>);

impl AllowedOrigins {
    pub fn new(origins: Vec<String>) -> Self {
        Self(origins)
    }

    pub fn contains(&self, origin: &HeaderValue) -> bool {
        origin
            .to_str()
            .map(|candidate| self.0.iter().any(|allowed| allowed == candidate))
            .unwrap_or(false)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_email_base_url() -> String {
    "https://api.postmarkapp.com".to_string()
}

fn default_email_sender() -> String {
    "noreply@localhost".to_string()
}

fn default_email_timeout_ms() -> u64 {
    10_000
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    const FULL_CONFIG: &str = r#"
    {
        "postgres": { "url": "postgres://localhost/identity" },
        "auth": {
            "jwt_secret": "secret",
            "token_issuer": "identity-service",
            "argon2": { "memory_kib": 19456, "iterations": 2, "parallelism": 1 }
        },
        "verification": { "resend_delay_ms": 60000, "max_sends_per_hour": 3 },
        "github": {
            "client_id": "id",
            "client_secret": "secret",
            "redirect_url": "https://app.example.com/oauth/callback"
        }
    }
    "#;

    fn parse(raw: &str) -> Result<Settings, ConfigError> {
        Config::builder()
            .add_source(config::File::from_str(raw, FileFormat::Json))
            .build()?
            .try_deserialize()
    }

    #[test]
    fn full_configuration_parses_with_defaults_filled_in() {
        let settings = parse(FULL_CONFIG).unwrap();
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.verification.max_sends_per_hour, 3);
        assert_eq!(settings.auth.argon2.iterations, 2);
        assert!(settings.allowed_origins.is_none());
    }

    #[test]
    fn missing_argon2_cost_fails_startup() {
        let raw = FULL_CONFIG.replace(
            r#""argon2": { "memory_kib": 19456, "iterations": 2, "parallelism": 1 }"#,
            r#""argon2_unused": true"#,
        );
        assert!(parse(&raw).is_err());
    }

    #[test]
    fn missing_throttle_thresholds_fail_startup() {
        let raw = FULL_CONFIG.replace(r#""max_sends_per_hour": 3"#, r#""unused": 3"#);
        assert!(parse(&raw).is_err());
    }

    #[test]
    fn allowed_origins_match_exactly() {
        let origins = AllowedOrigins::new(vec!["https://app.example.com".to_string()]);
        assert!(origins.contains(&HeaderValue::from_static("https://app.example.com")));
        assert!(!origins.contains(&HeaderValue::from_static("https://evil.example.com")));
    }
}
