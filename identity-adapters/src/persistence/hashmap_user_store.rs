use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use identity_core::{User, UserId, UserPatch, UserRepository, UserRepositoryError};

/// In-memory user repository.
///
/// There is no storage engine underneath to enforce uniqueness, so every
/// check-then-write runs under a single write lock; that lock is the
/// mutual-exclusion scope that makes concurrent saves of the same
/// login/email/github-id safe.
#[derive(Default, Clone)]
pub struct HashMapUserStore {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl HashMapUserStore {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait::async_trait]
impl UserRepository for HashMapUserStore {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserRepositoryError> {
        let users = self.users.read().await;
        Ok(users.values().find(|user| user.email() == email).cloned())
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, UserRepositoryError> {
        let users = self.users.read().await;
        Ok(users.values().find(|user| user.login() == login).cloned())
    }

    async fn find_by_github_id(
        &self,
        github_id: &str,
    ) -> Result<Option<User>, UserRepositoryError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|user| user.github_id() == Some(github_id))
            .cloned())
    }

    async fn save(&self, user: User) -> Result<User, UserRepositoryError> {
        let mut users = self.users.write().await;
        let taken = users.values().any(|existing| {
            existing.login() == user.login()
                || existing.email() == user.email()
                || (user.github_id().is_some() && existing.github_id() == user.github_id())
        });
        if taken {
            return Err(UserRepositoryError::AlreadyExists);
        }
        users.insert(*user.id(), user.clone());
        Ok(user)
    }

    async fn update(&self, id: &UserId, patch: UserPatch) -> Result<User, UserRepositoryError> {
        let mut users = self.users.write().await;

        if let Some(email) = &patch.email {
            let taken = users
                .values()
                .any(|other| other.id() != id && other.email() == email);
            if taken {
                return Err(UserRepositoryError::AlreadyExists);
            }
        }

        let user = users.get_mut(id).ok_or(UserRepositoryError::NotFound)?;
        if let Some(email) = patch.email {
            user.set_email(email);
        }
        if let Some(password_hash) = patch.password_hash {
            user.set_password_hash(password_hash);
        }
        if let Some(verified) = patch.is_email_verified {
            user.set_email_verified(verified);
        }
        Ok(user.clone())
    }

    async fn deactivate(&self, id: &UserId) -> Result<bool, UserRepositoryError> {
        let mut users = self.users.write().await;
        match users.get_mut(id) {
            Some(user) => {
                user.deactivate();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
