use anyhow::anyhow;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::config::auth::AuthConfig;
use crate::modules::auth::model::{AccessClaims, PurposeClaims, RefreshClaims};
use crate::modules::auth::model::Principal;
use crate::modules::tokens::model::RefreshTokenRecord;
use crate::utils::errors::AppError;

/// Lifetime of password-reset and email-confirmation tokens.
const PURPOSE_TOKEN_MINUTES: i64 = 60;

/// What a single-purpose token is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPurpose {
    PasswordReset,
    EmailConfirmation,
}

impl TokenPurpose {
    fn as_str(self) -> &'static str {
        match self {
            TokenPurpose::PasswordReset => "password_reset",
            TokenPurpose::EmailConfirmation => "email_confirmation",
        }
    }
}

/// Builds and verifies the signed tokens that travel over the wire.
///
/// All tokens are HS256-signed with the configured key and carry the
/// configured issuer and audience, which are validated on decode.
#[derive(Clone, Debug)]
pub struct TokenService {
    config: AuthConfig,
}

impl TokenService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Creates a short-lived access token embedding the principal's claims.
    pub fn create_access_token(
        &self,
        principal: &Principal,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        let now = Utc::now();
        let expires_at = now + Duration::minutes(self.config.access_token_minutes);

        let claims = AccessClaims {
            sub: principal.subject.clone(),
            email: principal.email.clone(),
            roles: principal.roles.clone(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            iat: now.timestamp() as usize,
            exp: expires_at.timestamp() as usize,
        };

        let token = self.sign(&claims)?;
        Ok((token, expires_at))
    }

    /// Wraps a stored refresh token in a signed envelope.
    ///
    /// The envelope's claims are exactly the subject and the opaque token
    /// value, and its expiry equals the stored record's expiry, so the
    /// refresh scheme can verify integrity before consulting the store.
    pub fn create_refresh_bearer_token(
        &self,
        record: &RefreshTokenRecord,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        let now = Utc::now();

        let claims = RefreshClaims {
            sub: record.user_id.to_string(),
            rft: record.token_value.clone(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            iat: now.timestamp() as usize,
            exp: record.expires_at.timestamp() as usize,
        };

        let token = self.sign(&claims)?;
        Ok((token, record.expires_at))
    }

    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, AppError> {
        decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(self.config.signing_key.as_bytes()),
            &self.validation(),
        )
        .map(|data| data.claims)
        .map_err(|_| AppError::unauthorized(anyhow!("Invalid or expired token")))
    }

    pub fn verify_refresh_bearer_token(&self, token: &str) -> Result<RefreshClaims, AppError> {
        decode::<RefreshClaims>(
            token,
            &DecodingKey::from_secret(self.config.signing_key.as_bytes()),
            &self.validation(),
        )
        .map(|data| data.claims)
        .map_err(|_| AppError::unauthorized(anyhow!("Invalid or expired refresh token")))
    }

    /// Creates a single-purpose token (password reset, email confirmation).
    pub fn create_purpose_token(
        &self,
        user_id: Uuid,
        email: &str,
        purpose: TokenPurpose,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + Duration::minutes(PURPOSE_TOKEN_MINUTES);

        let claims = PurposeClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            purpose: purpose.as_str().to_string(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            iat: now.timestamp() as usize,
            exp: expires_at.timestamp() as usize,
        };

        self.sign(&claims)
    }

    pub fn verify_purpose_token(
        &self,
        token: &str,
        purpose: TokenPurpose,
    ) -> Result<PurposeClaims, AppError> {
        let claims = decode::<PurposeClaims>(
            token,
            &DecodingKey::from_secret(self.config.signing_key.as_bytes()),
            &self.validation(),
        )
        .map(|data| data.claims)
        .map_err(|_| AppError::bad_request(anyhow!("Invalid or expired token")))?;

        if claims.purpose != purpose.as_str() {
            return Err(AppError::bad_request(anyhow!("Invalid or expired token")));
        }

        Ok(claims)
    }

    fn sign<C: serde::Serialize>(&self, claims: &C) -> Result<String, AppError> {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(self.config.signing_key.as_bytes()),
        )
        .map_err(|e| AppError::internal(anyhow!("Failed to create token: {}", e)))
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);
        validation
    }
}
