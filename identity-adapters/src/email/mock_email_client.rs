use identity_core::EmailClient;

/// Email client for local development: logs instead of sending and always
/// reports success.
#[derive(Debug, Clone, Default)]
pub struct MockEmailClient;

impl MockEmailClient {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl EmailClient for MockEmailClient {
    async fn send_verification_code(&self, recipient: &str, code: &str) -> bool {
        tracing::info!(recipient, code, "[mock email] verification code");
        true
    }

    async fn send_welcome(&self, recipient: &str, display_name: &str) -> bool {
        tracing::info!(recipient, display_name, "[mock email] welcome");
        true
    }

    async fn send_password_reset(&self, recipient: &str, _reset_token: &str) -> bool {
        tracing::info!(recipient, "[mock email] password reset token");
        true
    }
}
