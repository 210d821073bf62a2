use anyhow::anyhow;
use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum_extra::extract::cookie::CookieJar;
use tracing::instrument;
use utoipa::ToSchema;

use super::model::{
    AccessTokenResponse, ChangePasswordRequest, ConfirmEmailRequest, ForgotPasswordRequest,
    MessageResponse, ResetPasswordRequest, SignInQuery, SignInRequest, SignUpRequest,
    WhoAmIResponse,
};
use super::protocol::{IssueMode, clear_auth_cookies};
use super::service::AuthService;
use crate::middleware::auth::{AuthUser, RefreshPrincipal};
use crate::modules::users::model::User;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::TokenPurpose;
use crate::validator::ValidatedJson;

#[derive(ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Account created", body = User),
        (status = 400, description = "Validation error or email already registered", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn sign_up(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<SignUpRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = AuthService::register_user(&state.db, dto).await?;

    let token = state.protocol.token_service().create_purpose_token(
        user.id,
        &user.email,
        TokenPurpose::EmailConfirmation,
    )?;
    if let Err(e) = state
        .email_service
        .send_confirmation_email(&user.email, &user.display_name, &token)
        .await
    {
        tracing::warn!(error = ?e.error, "failed to send confirmation email");
    }

    Ok((StatusCode::CREATED, Json(user)))
}

/// Sign in (cookie flow)
///
/// Sets the refresh token as an HttpOnly cookie. With `?useCookie=true`
/// the access token is also delivered as a cookie instead of in the body.
#[utoipa::path(
    post,
    path = "/api/auth/signin",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = AccessTokenResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn sign_in(
    State(state): State<AppState>,
    Query(query): Query<SignInQuery>,
    jar: CookieJar,
    ValidatedJson(dto): ValidatedJson<SignInRequest>,
) -> Result<(CookieJar, Json<AccessTokenResponse>), AppError> {
    let user = AuthService::verify_credentials(&state.db, &dto.email, &dto.password).await?;

    if let Err(e) = AuthService::record_login(&state.db, user.id).await {
        tracing::warn!(error = ?e.error, "failed to record last login");
    }

    let mode = IssueMode::Cookie {
        use_access_cookie: query.use_cookie.unwrap_or(false),
    };
    let issued = state.protocol.issue(&user.principal()).await?;

    Ok((
        issued.apply_cookies(jar, mode),
        Json(issued.response_body(mode)),
    ))
}

/// Sign in (stateless token flow)
///
/// Returns both tokens in the response body; no cookies are set.
#[utoipa::path(
    post,
    path = "/api/auth/token",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = AccessTokenResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn token(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<SignInRequest>,
) -> Result<Json<AccessTokenResponse>, AppError> {
    let user = AuthService::verify_credentials(&state.db, &dto.email, &dto.password).await?;

    if let Err(e) = AuthService::record_login(&state.db, user.id).await {
        tracing::warn!(error = ?e.error, "failed to record last login");
    }

    let issued = state.protocol.issue(&user.principal()).await?;

    Ok(Json(issued.response_body(IssueMode::Stateless)))
}

/// Refresh (cookie flow)
#[utoipa::path(
    post,
    path = "/api/auth/signin/refresh",
    responses(
        (status = 200, description = "Tokens re-issued", body = AccessTokenResponse),
        (status = 401, description = "Invalid or expired refresh token", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn sign_in_refresh(
    State(state): State<AppState>,
    Query(query): Query<SignInQuery>,
    jar: CookieJar,
    refresh: RefreshPrincipal,
) -> Result<(CookieJar, Json<AccessTokenResponse>), AppError> {
    let principal = refresh_principal(&state, &refresh).await?;

    let mode = IssueMode::Cookie {
        use_access_cookie: query.use_cookie.unwrap_or(false),
    };
    let issued = state
        .protocol
        .refresh(refresh.user_id, &refresh.token_value, &principal)
        .await?;

    Ok((
        issued.apply_cookies(jar, mode),
        Json(issued.response_body(mode)),
    ))
}

/// Refresh (stateless token flow)
#[utoipa::path(
    post,
    path = "/api/auth/token/refresh",
    responses(
        (status = 200, description = "Tokens re-issued", body = AccessTokenResponse),
        (status = 401, description = "Invalid or expired refresh token", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn token_refresh(
    State(state): State<AppState>,
    refresh: RefreshPrincipal,
) -> Result<Json<AccessTokenResponse>, AppError> {
    let principal = refresh_principal(&state, &refresh).await?;

    let issued = state
        .protocol
        .refresh(refresh.user_id, &refresh.token_value, &principal)
        .await?;

    Ok(Json(issued.response_body(IssueMode::Stateless)))
}

/// Sign out: deletes the stored refresh token and clears auth cookies.
#[utoipa::path(
    post,
    path = "/api/auth/signout",
    responses(
        (status = 200, description = "Signed out", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn sign_out(
    State(state): State<AppState>,
    auth_user: AuthUser,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), AppError> {
    state.protocol.sign_out(auth_user.user_id().ok()).await?;

    Ok((
        clear_auth_cookies(jar),
        Json(MessageResponse {
            message: "Signed out".to_string(),
        }),
    ))
}

/// Identity snapshot for the authenticated caller
#[utoipa::path(
    get,
    path = "/api/auth/whoami",
    responses(
        (status = 200, description = "Claims snapshot", body = WhoAmIResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn who_am_i(auth_user: AuthUser) -> Json<WhoAmIResponse> {
    Json(WhoAmIResponse {
        user_id: auth_user.0.sub,
        email: auth_user.0.email,
        roles: auth_user.0.roles,
    })
}

/// Request a password reset link
///
/// Responds 200 whether or not the email matches an account.
#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset link sent if the account exists", body = MessageResponse),
        (status = 400, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    AuthService::forgot_password(
        &state.db,
        dto,
        state.protocol.token_service(),
        &state.email_service,
    )
    .await?;

    Ok(Json(MessageResponse {
        message: "If an account exists with that email, a password reset link has been sent."
            .to_string(),
    }))
}

/// Change the password of the authenticated user
#[utoipa::path(
    post,
    path = "/api/auth/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Validation error or wrong current password", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn change_password(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    AuthService::change_password(&state.db, auth_user.user_id()?, dto).await?;

    Ok(Json(MessageResponse {
        message: "Password changed successfully.".to_string(),
    }))
}

/// Reset the password using a reset token
#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset", body = MessageResponse),
        (status = 400, description = "Invalid or expired token", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    AuthService::reset_password(&state.db, dto, state.protocol.token_service()).await?;

    Ok(Json(MessageResponse {
        message: "Password has been reset successfully.".to_string(),
    }))
}

/// Confirm an email address
#[utoipa::path(
    post,
    path = "/api/auth/confirm-email",
    request_body = ConfirmEmailRequest,
    responses(
        (status = 200, description = "Email confirmed", body = MessageResponse),
        (status = 400, description = "Invalid or expired token", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn confirm_email(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<ConfirmEmailRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    AuthService::confirm_email(&state.db, dto, state.protocol.token_service()).await?;

    Ok(Json(MessageResponse {
        message: "Email confirmed. You can now sign in.".to_string(),
    }))
}

/// The refresh endpoints rebuild the principal from the user row so that
/// re-issued tokens carry current roles; a deleted user therefore fails
/// with the same 401 as a bad token.
async fn refresh_principal(
    state: &AppState,
    refresh: &RefreshPrincipal,
) -> Result<crate::modules::auth::model::Principal, AppError> {
    let user = AuthService::find_by_id(&state.db, refresh.user_id)
        .await?
        .ok_or_else(|| AppError::unauthorized(anyhow!("Invalid or expired refresh token")))?;

    Ok(user.principal())
}
