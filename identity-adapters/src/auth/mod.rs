pub mod argon2_password_hasher;
pub mod github_oauth_client;
pub mod jwt_token_service;

pub use argon2_password_hasher::{Argon2Cost, Argon2PasswordHasher};
pub use github_oauth_client::GithubOAuthClient;
pub use jwt_token_service::{JwtTokenService, TOKEN_TTL_SECONDS};
