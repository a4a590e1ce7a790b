pub mod current_user;
pub mod use_cases;
pub mod verification;

#[cfg(test)]
pub(crate) mod test_support;

pub use current_user::{CurrentUserError, resolve_current_user};
pub use use_cases::{
    deactivate_user::{DeactivateUserError, DeactivateUserUseCase},
    email_verification::{EmailVerificationError, EmailVerificationUseCase},
    github_login::{GithubLoginError, GithubLoginUseCase, LOGIN_GENERATION_LIMIT},
    login::{LoginError, LoginUseCase},
    refresh_token::{RefreshTokenError, RefreshTokenUseCase},
    register::{RegisterError, RegisterUseCase},
    update_user::{MIN_UPDATED_PASSWORD_LENGTH, UpdateUserError, UpdateUserUseCase, UserUpdate},
};
pub use verification::{EmailVerificationService, VerificationError, VerificationPolicy};
