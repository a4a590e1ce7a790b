use chrono::Utc;
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use identity_core::{TokenError, TokenService, UserId};

/// Tokens are valid for a fixed 24 hours from issuance.
pub const TOKEN_TTL_SECONDS: i64 = 24 * 60 * 60;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iss: String,
    iat: i64,
    nbf: i64,
    exp: i64,
}

/// JWT-backed token service signing with a service-held symmetric key.
#[derive(Clone)]
pub struct JwtTokenService {
    secret: Secret<String>,
    issuer: String,
}

impl JwtTokenService {
    pub fn new(secret: Secret<String>, issuer: String) -> Self {
        Self { secret, issuer }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);
        validation.validate_nbf = true;
        validation
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.expose_secret().as_bytes()),
            &self.validation(),
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::ImmatureSignature => TokenError::NotYetValid,
            _ => TokenError::Malformed,
        })
    }
}

impl TokenService for JwtTokenService {
    fn generate_token(&self, subject: &UserId) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            iss: self.issuer.clone(),
            iat: now,
            nbf: now,
            exp: now + TOKEN_TTL_SECONDS,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.expose_secret().as_bytes()),
        )
        .map_err(|e| TokenError::Issue(e.to_string()))
    }

    fn verify_token(&self, token: &str) -> bool {
        self.decode_claims(token).is_ok()
    }

    fn decode_token(&self, token: &str) -> Result<UserId, TokenError> {
        let claims = self.decode_claims(token)?;
        UserId::parse(&claims.sub).map_err(|_| TokenError::Malformed)
    }

    fn refresh_token(&self, token: &str) -> Result<String, TokenError> {
        let subject = self.decode_token(token)?;
        self.generate_token(&subject)
    }
}
