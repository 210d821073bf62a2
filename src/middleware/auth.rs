use anyhow::anyhow;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use crate::modules::auth::model::AccessClaims;
use crate::modules::auth::protocol::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Extractor that authenticates a request via the access-token scheme:
/// a bearer token in the `Authorization` header, or the `AccessToken`
/// cookie for clients on the cookie flow.
#[derive(Debug, Clone)]
pub struct AuthUser(pub AccessClaims);

impl AuthUser {
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.0.sub)
            .map_err(|_| AppError::unauthorized(anyhow!("Invalid subject in token")))
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.0.roles.iter().any(|r| r == role)
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .or_else(|| cookie_token(parts, ACCESS_TOKEN_COOKIE))
            .ok_or_else(|| AppError::unauthorized(anyhow!("Missing authentication token")))?;

        let claims = state.protocol.token_service().verify_access_token(&token)?;

        Ok(AuthUser(claims))
    }
}

/// Extractor implementing the refresh authentication scheme.
///
/// Pulls the refresh bearer token from the `RefreshToken` cookie or the
/// `Authorization` header and verifies its signature, expiry, issuer and
/// audience. That is only the cryptographic half of refresh validation;
/// the endpoint still has to check the embedded value against the store.
#[derive(Debug, Clone)]
pub struct RefreshPrincipal {
    pub user_id: Uuid,
    pub token_value: String,
}

impl FromRequestParts<AppState> for RefreshPrincipal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = cookie_token(parts, REFRESH_TOKEN_COOKIE)
            .or_else(|| bearer_token(parts))
            .ok_or_else(|| AppError::unauthorized(anyhow!("Missing refresh token")))?;

        let claims = state
            .protocol
            .token_service()
            .verify_refresh_bearer_token(&token)?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::unauthorized(anyhow!("Invalid or expired refresh token")))?;

        Ok(RefreshPrincipal {
            user_id,
            token_value: claims.rft,
        })
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.to_string())
}

fn cookie_token(parts: &Parts, name: &str) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    jar.get(name).map(|cookie| cookie.value().to_string())
}
