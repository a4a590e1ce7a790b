use serde::{Deserialize, Serialize};

use identity_core::User;

/// Outward-facing projection of a user. The credential hash never leaves the
/// service.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub login: String,
    pub email: String,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    #[serde(rename = "isEmailVerified")]
    pub is_email_verified: bool,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            login: user.login().to_string(),
            email: user.email().to_string(),
            is_active: user.is_active(),
            is_email_verified: user.is_email_verified(),
        }
    }
}
