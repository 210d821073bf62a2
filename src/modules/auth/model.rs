use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// The identity material tokens are minted from.
///
/// `subject` is the stable identity key correlating access and refresh
/// tokens; everything else is claim payload.
#[derive(Debug, Clone)]
pub struct Principal {
    pub subject: String,
    pub email: String,
    pub roles: Vec<String>,
}

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub email: String,
    pub roles: Vec<String>,
    pub iss: String,
    pub aud: String,
    pub iat: usize,
    pub exp: usize,
}

/// Claims carried by a refresh bearer token: the subject and the opaque
/// stored token value (`rft`), nothing else. The signed envelope is what
/// travels over the wire; the raw value is only ever compared against the
/// store.
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,
    pub rft: String,
    pub iss: String,
    pub aud: String,
    pub iat: usize,
    pub exp: usize,
}

/// Claims for single-purpose tokens (password reset, email confirmation).
/// The `purpose` claim prevents a reset token from confirming an email and
/// vice versa.
#[derive(Debug, Serialize, Deserialize)]
pub struct PurposeClaims {
    pub sub: String,
    pub email: String,
    pub purpose: String,
    pub iss: String,
    pub aud: String,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignInRequest {
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignUpRequest {
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "display_name must not be empty"))]
    pub display_name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
    #[validate(length(min = 8, message = "new_password must be at least 8 characters"))]
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignInQuery {
    #[serde(rename = "useCookie")]
    pub use_cookie: Option<bool>,
}

/// Token response body. In the cookie flow the access token may live in a
/// cookie instead of the body, and the refresh token always does, so both
/// fields are optional.
#[derive(Debug, Serialize, ToSchema)]
pub struct AccessTokenResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub token_type: &'static str,
    pub expires_in: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WhoAmIResponse {
    pub user_id: String,
    pub email: String,
    pub roles: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "token must not be empty"))]
    pub token: String,
    #[validate(length(min = 8, message = "new_password must be at least 8 characters"))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ConfirmEmailRequest {
    #[validate(length(min = 1, message = "token must not be empty"))]
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}
