use reqwest::{Client, Url};
use secrecy::{ExposeSecret, Secret};

use identity_core::EmailClient;

const MESSAGE_STREAM: &str = "outbound";
const POSTMARK_AUTH_HEADER: &str = "X-Postmark-Server-Token";

/// Email dispatch through the Postmark HTTP API.
///
/// Delivery outcomes surface as bools per the [`EmailClient`] contract;
/// transport failures are logged and count as undelivered.
#[derive(Clone)]
pub struct PostmarkEmailClient {
    http_client: Client,
    base_url: String,
    sender: String,
    authorization_token: Secret<String>,
}

impl PostmarkEmailClient {
    pub fn new(
        base_url: String,
        sender: String,
        authorization_token: Secret<String>,
        http_client: Client,
    ) -> Self {
        Self {
            http_client,
            base_url,
            sender,
            authorization_token,
        }
    }

    async fn deliver(&self, recipient: &str, subject: &str, content: &str) -> Result<(), String> {
        let base = Url::parse(&self.base_url).map_err(|e| e.to_string())?;
        let url = base.join("/email").map_err(|e| e.to_string())?;

        let request_body = SendEmailRequest {
            from: &self.sender,
            to: recipient,
            subject,
            html_body: content,
            text_body: content,
            message_stream: MESSAGE_STREAM,
        };

        let request = self
            .http_client
            .post(url)
            .header(
                POSTMARK_AUTH_HEADER,
                self.authorization_token.expose_secret(),
            )
            .json(&request_body);

        request
            .send()
            .await
            .map_err(|e| e.to_string())?
            .error_for_status()
            .map_err(|e| e.to_string())?;

        Ok(())
    }

    async fn deliver_logged(&self, recipient: &str, subject: &str, content: &str) -> bool {
        match self.deliver(recipient, subject, content).await {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(recipient, subject, %error, "email delivery failed");
                false
            }
        }
    }
}

#[async_trait::async_trait]
impl EmailClient for PostmarkEmailClient {
    #[tracing::instrument(name = "Sending verification code email", skip_all)]
    async fn send_verification_code(&self, recipient: &str, code: &str) -> bool {
        let content = format!(
            "Your verification code is {code}. It expires in 15 minutes."
        );
        self.deliver_logged(recipient, "Verify your email address", &content)
            .await
    }

    #[tracing::instrument(name = "Sending welcome email", skip_all)]
    async fn send_welcome(&self, recipient: &str, display_name: &str) -> bool {
        let content = format!("Welcome, {display_name}! Your account is ready.");
        self.deliver_logged(recipient, "Welcome", &content).await
    }

    #[tracing::instrument(name = "Sending password reset email", skip_all)]
    async fn send_password_reset(&self, recipient: &str, reset_token: &str) -> bool {
        let content = format!("Use this token to reset your password: {reset_token}");
        self.deliver_logged(recipient, "Password reset", &content)
            .await
    }
}

#[derive(serde::Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html_body: &'a str,
    text_body: &'a str,
    message_stream: &'a str,
}
