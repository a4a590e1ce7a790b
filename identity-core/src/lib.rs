pub mod domain;
pub mod ports;

// Re-export commonly used types for convenience
pub use domain::{
    github_profile::GithubProfile,
    login_result::LoginResult,
    user::{NewUser, User, UserId},
    verification::{PasswordResetToken, StoredVerificationCode, VerificationCode},
};

pub use ports::{
    repositories::{
        UserPatch, UserRepository, UserRepositoryError, VerificationCodeStore,
        VerificationStoreError,
    },
    services::{
        EmailClient, GithubOAuthError, GithubOAuthProvider, PasswordHashError, PasswordHasher,
        TokenError, TokenService,
    },
};
