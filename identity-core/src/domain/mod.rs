pub mod github_profile;
pub mod login_result;
pub mod user;
pub mod verification;
