use axum::Json;
use axum::extract::{Path, Query, State};
use tracing::instrument;
use uuid::Uuid;

use super::model::{
    PaginatedUsersResponse, SetLockoutRequest, UpdateRolesRequest, User, UserFilterParams,
};
use super::service::UserService;
use crate::modules::auth::model::MessageResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::{PaginationMeta, PaginationParams};
use crate::validator::ValidatedJson;

/// List users (paged, optional search)
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Paged user listing", body = PaginatedUsersResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Admin role required")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip_all)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<UserFilterParams>,
) -> Result<Json<PaginatedUsersResponse>, AppError> {
    let (users, total) =
        UserService::list_users(&state.db, &pagination, filter.search.as_deref()).await?;

    let meta = PaginationMeta {
        total,
        limit: pagination.limit(),
        offset: pagination.offset(),
        has_more: pagination.offset() + (users.len() as i64) < total,
    };

    Ok(Json(PaginatedUsersResponse { data: users, meta }))
}

/// Get a user by id
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    responses(
        (status = 200, description = "The user", body = User),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip_all)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    let user = UserService::get_user(&state.db, id).await?;
    Ok(Json(user))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip_all)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    UserService::delete_user(&state.db, id).await?;
    Ok(Json(MessageResponse {
        message: "User deleted successfully".to_string(),
    }))
}

/// Set or lift a lockout
#[utoipa::path(
    put,
    path = "/api/users/{id}/lockout",
    request_body = SetLockoutRequest,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip_all)]
pub async fn set_lockout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<SetLockoutRequest>,
) -> Result<Json<User>, AppError> {
    let user = UserService::set_lockout(&state.db, id, dto.until).await?;
    Ok(Json(user))
}

/// Replace a user's roles
#[utoipa::path(
    put,
    path = "/api/users/{id}/roles",
    request_body = UpdateRolesRequest,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip_all)]
pub async fn update_roles(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateRolesRequest>,
) -> Result<Json<User>, AppError> {
    let user = UserService::update_roles(&state.db, id, dto.roles).await?;
    Ok(Json(user))
}

/// Resend the email-confirmation link
#[utoipa::path(
    post,
    path = "/api/users/{id}/resend-confirmation",
    responses(
        (status = 200, description = "Confirmation email queued", body = MessageResponse),
        (status = 400, description = "Email already confirmed"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip_all)]
pub async fn resend_confirmation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    UserService::resend_confirmation(
        &state.db,
        id,
        state.protocol.token_service(),
        &state.email_service,
    )
    .await?;

    Ok(Json(MessageResponse {
        message: "Confirmation email sent".to_string(),
    }))
}
