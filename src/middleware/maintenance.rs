use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::state::AppState;

/// Returns 503 for regular traffic while maintenance mode is on. Auth,
/// admin and health endpoints stay reachable so admins can still sign in
/// and turn the flag back off.
pub async fn maintenance_gate(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    if state.maintenance.is_enabled() {
        let path = req.uri().path();
        if !path.starts_with("/api/auth")
            && !path.starts_with("/api/admin")
            && !path.starts_with("/health")
        {
            tracing::info!(%path, "blocked during maintenance");
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": "System is under maintenance. Please try again later.",
                    "maintenance_mode": true
                })),
            )
                .into_response();
        }
    }

    next.run(req).await
}
