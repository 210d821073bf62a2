use anyhow::anyhow;
use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};

use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub const ADMIN_ROLE: &str = "admin";

/// Route-layer middleware restricting a subtree to admins. The
/// authenticated user is stashed in request extensions for handlers that
/// want it.
pub async fn require_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await?;
    if !auth_user.has_role(ADMIN_ROLE) {
        return Err(AppError::forbidden(anyhow!(
            "Access denied. Admin role required"
        )));
    }

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(auth_user);

    Ok(next.run(req).await)
}
