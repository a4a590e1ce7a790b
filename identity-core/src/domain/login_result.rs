use crate::domain::user::User;

/// Transient result of a successful authentication. Never persisted.
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub user: User,
    pub access_token: String,
}

impl LoginResult {
    pub fn new(user: User, access_token: String) -> Self {
        Self { user, access_token }
    }
}
