use axum::Json;
use axum::extract::State;
use tracing::instrument;

use super::model::{MaintenanceStatusResponse, SetMaintenanceRequest};
use super::service::MaintenanceService;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

/// Get maintenance-mode status
#[utoipa::path(
    get,
    path = "/api/admin/maintenance",
    responses(
        (status = 200, description = "Current maintenance status", body = MaintenanceStatusResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Admin role required")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
#[instrument(skip_all)]
pub async fn get_maintenance(
    State(state): State<AppState>,
) -> Result<Json<MaintenanceStatusResponse>, AppError> {
    let status = MaintenanceService::status(&state.db).await?;
    Ok(Json(status))
}

/// Enable or disable maintenance mode
#[utoipa::path(
    put,
    path = "/api/admin/maintenance",
    request_body = SetMaintenanceRequest,
    responses(
        (status = 200, description = "Updated maintenance status", body = MaintenanceStatusResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Admin role required")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
#[instrument(skip_all)]
pub async fn set_maintenance(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<SetMaintenanceRequest>,
) -> Result<Json<MaintenanceStatusResponse>, AppError> {
    let status = MaintenanceService::set(
        &state.db,
        &state.maintenance,
        dto.enabled,
        dto.reason,
        auth_user.email(),
    )
    .await?;

    Ok(Json(status))
}
