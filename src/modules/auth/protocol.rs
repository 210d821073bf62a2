use anyhow::anyhow;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::model::{AccessTokenResponse, Principal};
use crate::modules::tokens::manager::RefreshTokenManager;
use crate::modules::tokens::store::RefreshTokenStore;
use crate::utils::errors::AppError;
use crate::utils::jwt::TokenService;

pub const REFRESH_TOKEN_COOKIE: &str = "RefreshToken";
pub const ACCESS_TOKEN_COOKIE: &str = "AccessToken";

/// How issued tokens are delivered to the client.
///
/// The cookie flow serves interactive clients: the refresh token always
/// rides an HttpOnly cookie, and the access token optionally does too. The
/// stateless flow serves API clients: both tokens go in the response body
/// and no cookies are touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueMode {
    Cookie { use_access_cookie: bool },
    Stateless,
}

/// The product of one issuance: a fresh access token and a fresh, already
/// persisted refresh token in its signed wire form.
#[derive(Debug, Clone)]
pub struct IssuedTokens {
    pub access_token: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_token: String,
    pub refresh_expires_at: DateTime<Utc>,
}

impl IssuedTokens {
    pub fn response_body(&self, mode: IssueMode) -> AccessTokenResponse {
        let expires_in = (self.access_expires_at - Utc::now()).num_seconds();
        match mode {
            IssueMode::Cookie { use_access_cookie } => AccessTokenResponse {
                access_token: (!use_access_cookie).then(|| self.access_token.clone()),
                refresh_token: None,
                token_type: "Bearer",
                expires_in,
            },
            IssueMode::Stateless => AccessTokenResponse {
                access_token: Some(self.access_token.clone()),
                refresh_token: Some(self.refresh_token.clone()),
                token_type: "Bearer",
                expires_in,
            },
        }
    }

    pub fn apply_cookies(&self, jar: CookieJar, mode: IssueMode) -> CookieJar {
        match mode {
            IssueMode::Cookie { use_access_cookie } => {
                let jar = jar.add(auth_cookie(
                    REFRESH_TOKEN_COOKIE,
                    self.refresh_token.clone(),
                    self.refresh_expires_at,
                ));
                if use_access_cookie {
                    jar.add(auth_cookie(
                        ACCESS_TOKEN_COOKIE,
                        self.access_token.clone(),
                        self.access_expires_at,
                    ))
                } else {
                    jar
                }
            }
            IssueMode::Stateless => jar,
        }
    }
}

/// The sign-in protocol shared by the cookie and stateless flows.
///
/// Both flows run the same issuance core; only the delivery (`IssueMode`)
/// differs. Refresh re-runs issuance, which rotates the stored token value
/// and thereby invalidates the one just presented.
#[derive(Clone)]
pub struct SignInProtocol<S: RefreshTokenStore> {
    token_service: TokenService,
    tokens: RefreshTokenManager<S>,
}

impl<S: RefreshTokenStore> SignInProtocol<S> {
    pub fn new(token_service: TokenService, tokens: RefreshTokenManager<S>) -> Self {
        Self {
            token_service,
            tokens,
        }
    }

    pub fn token_service(&self) -> &TokenService {
        &self.token_service
    }

    /// Issues an access token and a rotated refresh token for the principal.
    pub async fn issue(&self, principal: &Principal) -> Result<IssuedTokens, AppError> {
        let (access_token, access_expires_at) =
            self.token_service.create_access_token(principal)?;

        let record = self.tokens.create_token(principal).await?;
        let (refresh_token, refresh_expires_at) =
            self.token_service.create_refresh_bearer_token(&record)?;

        Ok(IssuedTokens {
            access_token,
            access_expires_at,
            refresh_token,
            refresh_expires_at,
        })
    }

    /// Validates a presented refresh-token value against the store, then
    /// re-runs issuance. The presented value must match the stored one
    /// exactly and be unexpired; a token already rotated away by a
    /// concurrent request fails here and the client must re-authenticate.
    /// On failure nothing is issued and the store is not touched.
    pub async fn refresh(
        &self,
        user_id: Uuid,
        presented_value: &str,
        principal: &Principal,
    ) -> Result<IssuedTokens, AppError> {
        if !self.tokens.validate(user_id, presented_value).await? {
            return Err(AppError::unauthorized(anyhow!(
                "Invalid or expired refresh token"
            )));
        }

        self.issue(principal).await
    }

    /// Clears the stored refresh token. Idempotent.
    pub async fn sign_out(&self, user_id: Option<Uuid>) -> Result<(), AppError> {
        self.tokens.clear_token(user_id).await
    }
}

fn auth_cookie(name: &'static str, value: String, expires_at: DateTime<Utc>) -> Cookie<'static> {
    let max_age = (expires_at - Utc::now()).num_seconds().max(0);
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .max_age(time::Duration::seconds(max_age))
        .build()
}

fn expired_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .max_age(time::Duration::seconds(0))
        .build()
}

/// Expires both auth cookies; used on sign-out.
pub fn clear_auth_cookies(jar: CookieJar) -> CookieJar {
    jar.add(expired_cookie(REFRESH_TOKEN_COOKIE))
        .add(expired_cookie(ACCESS_TOKEN_COOKIE))
}
