use reqwest::{Client, Url, header};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use identity_core::{GithubOAuthError, GithubOAuthProvider, GithubProfile};

const GITHUB_AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const GITHUB_API_BASE_URL: &str = "https://api.github.com";
const OAUTH_SCOPE: &str = "user:email";
// The GitHub API rejects requests without a User-Agent.
const USER_AGENT: &str = "identity-service";

/// GitHub OAuth adapter: authorization-code exchange followed by a profile
/// fetch, normalized into a [`GithubProfile`].
#[derive(Clone)]
pub struct GithubOAuthClient {
    http_client: Client,
    client_id: String,
    client_secret: Secret<String>,
    redirect_url: String,
    token_url: String,
    api_base_url: String,
}

impl GithubOAuthClient {
    pub fn new(
        client_id: String,
        client_secret: Secret<String>,
        redirect_url: String,
        http_client: Client,
    ) -> Self {
        Self {
            http_client,
            client_id,
            client_secret,
            redirect_url,
            token_url: GITHUB_TOKEN_URL.to_string(),
            api_base_url: GITHUB_API_BASE_URL.to_string(),
        }
    }

    /// Point the client at different endpoints (tests, GitHub Enterprise).
    pub fn with_endpoints(mut self, token_url: String, api_base_url: String) -> Self {
        self.token_url = token_url;
        self.api_base_url = api_base_url;
        self
    }

    #[tracing::instrument(name = "GitHub code exchange", skip_all)]
    async fn exchange_code(&self, code: &str) -> Result<String, GithubOAuthError> {
        let request_body = TokenExchangeRequest {
            client_id: &self.client_id,
            client_secret: self.client_secret.expose_secret(),
            code,
            redirect_uri: &self.redirect_url,
        };

        let response = self
            .http_client
            .post(&self.token_url)
            .header(header::ACCEPT, "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| GithubOAuthError::Exchange(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GithubOAuthError::Exchange(format!(
                "unexpected status {}",
                response.status()
            )));
        }

        let payload: TokenExchangeResponse = response
            .json()
            .await
            .map_err(|e| GithubOAuthError::Exchange(e.to_string()))?;

        if let Some(error) = payload.error {
            return Err(GithubOAuthError::Exchange(
                payload.error_description.unwrap_or(error),
            ));
        }

        payload.access_token.ok_or_else(|| {
            GithubOAuthError::Exchange("token response carried no access_token".to_string())
        })
    }

    #[tracing::instrument(name = "GitHub profile fetch", skip_all)]
    async fn fetch_user(&self, access_token: &str) -> Result<GithubProfile, GithubOAuthError> {
        let response = self
            .http_client
            .get(format!("{}/user", self.api_base_url))
            .bearer_auth(access_token)
            .header(header::ACCEPT, "application/json")
            .header(header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(|e| GithubOAuthError::Profile(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GithubOAuthError::Profile(format!(
                "unexpected status {}",
                response.status()
            )));
        }

        let payload: GithubUserResponse = response
            .json()
            .await
            .map_err(|e| GithubOAuthError::Profile(e.to_string()))?;

        Ok(GithubProfile {
            id: payload.id.to_string(),
            display_name: payload.name.unwrap_or_else(|| payload.login.clone()),
            login: payload.login,
            email: payload.email,
        })
    }
}

#[async_trait::async_trait]
impl GithubOAuthProvider for GithubOAuthClient {
    async fn fetch_profile(&self, code: &str) -> Result<GithubProfile, GithubOAuthError> {
        let access_token = self.exchange_code(code).await?;
        self.fetch_user(&access_token).await
    }

    fn authorization_url(&self) -> String {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", self.redirect_url.as_str()),
            ("scope", OAUTH_SCOPE),
        ];
        Url::parse_with_params(GITHUB_AUTHORIZE_URL, params)
            .expect("static authorize url must parse")
            .to_string()
    }
}

#[derive(Serialize)]
struct TokenExchangeRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
    redirect_uri: &'a str,
}

#[derive(Deserialize)]
struct TokenExchangeResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Deserialize)]
struct GithubUserResponse {
    id: u64,
    login: String,
    email: Option<String>,
    name: Option<String>,
}
