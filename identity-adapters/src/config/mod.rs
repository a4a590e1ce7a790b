pub mod settings;

pub use settings::{
    AllowedOrigins, EmailClientSettings, GithubSettings, PostgresSettings, ServerSettings,
    Settings, VerificationSettings,
};
