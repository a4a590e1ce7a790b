use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use identity_core::{StoredVerificationCode, VerificationCodeStore, VerificationStoreError};

/// In-memory verification code store.
///
/// Keeps the outstanding code per email plus a send log; the log outlives the
/// code itself so the throttle window still counts sends whose code was
/// already consumed or overwritten.
#[derive(Default, Clone)]
pub struct HashMapVerificationCodeStore {
    codes: Arc<RwLock<HashMap<String, StoredVerificationCode>>>,
    sends: Arc<RwLock<HashMap<String, Vec<DateTime<Utc>>>>>,
}

impl HashMapVerificationCodeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl VerificationCodeStore for HashMapVerificationCodeStore {
    async fn save_code(
        &self,
        email: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), VerificationStoreError> {
        let now = Utc::now();
        self.codes.write().await.insert(
            email.to_string(),
            StoredVerificationCode {
                code: code.to_string(),
                expires_at,
                attempts: 0,
                created_at: now,
            },
        );
        self.sends
            .write()
            .await
            .entry(email.to_string())
            .or_default()
            .push(now);
        Ok(())
    }

    async fn find_code(
        &self,
        email: &str,
    ) -> Result<Option<StoredVerificationCode>, VerificationStoreError> {
        Ok(self.codes.read().await.get(email).cloned())
    }

    async fn increment_attempts(&self, email: &str) -> Result<(), VerificationStoreError> {
        if let Some(stored) = self.codes.write().await.get_mut(email) {
            stored.attempts += 1;
        }
        Ok(())
    }

    async fn delete_code(&self, email: &str) -> Result<(), VerificationStoreError> {
        self.codes.write().await.remove(email);
        Ok(())
    }

    async fn count_recent_sends(
        &self,
        email: &str,
        window: Duration,
    ) -> Result<u32, VerificationStoreError> {
        let since = Utc::now() - window;
        let sends = self.sends.read().await;
        let count = sends
            .get(email)
            .map(|timestamps| timestamps.iter().filter(|sent| **sent >= since).count())
            .unwrap_or(0);
        Ok(count as u32)
    }

    async fn last_sent_at(
        &self,
        email: &str,
    ) -> Result<Option<DateTime<Utc>>, VerificationStoreError> {
        let sends = self.sends.read().await;
        Ok(sends
            .get(email)
            .and_then(|timestamps| timestamps.last().copied()))
    }
}
