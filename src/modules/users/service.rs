use anyhow::anyhow;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use super::model::User;
use crate::utils::email::EmailService;
use crate::utils::errors::AppError;
use crate::utils::jwt::{TokenPurpose, TokenService};
use crate::utils::pagination::PaginationParams;

const USER_COLUMNS: &str =
    "id, email, display_name, roles, email_confirmed, lockout_end, last_login_at, created_at, updated_at";

/// Admin pass-throughs to the identity data. The token core does not
/// depend on anything here.
pub struct UserService;

impl UserService {
    pub async fn list_users(
        db: &PgPool,
        pagination: &PaginationParams,
        search: Option<&str>,
    ) -> Result<(Vec<User>, i64), AppError> {
        let pattern = search
            .map(|s| format!("%{}%", s.trim()))
            .unwrap_or_else(|| "%".to_string());

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE email ILIKE $1 OR display_name ILIKE $1
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        ))
        .bind(&pattern)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(db)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE email ILIKE $1 OR display_name ILIKE $1",
        )
        .bind(&pattern)
        .fetch_one(db)
        .await?;

        Ok((users, total))
    }

    pub async fn get_user(db: &PgPool, id: Uuid) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("User with id {} not found", id)))
    }

    /// Deletes the user; the refresh-token row goes with it via cascade.
    #[instrument(skip(db))]
    pub async fn delete_user(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("User with id {} not found", id)));
        }

        Ok(())
    }

    /// Sets or lifts the lockout window. `None` lifts it.
    #[instrument(skip(db))]
    pub async fn set_lockout(
        db: &PgPool,
        id: Uuid,
        until: Option<DateTime<Utc>>,
    ) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET lockout_end = $1, updated_at = NOW()
             WHERE id = $2
             RETURNING {USER_COLUMNS}"
        ))
        .bind(until)
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("User with id {} not found", id)))
    }

    /// Replaces the user's role set.
    #[instrument(skip(db))]
    pub async fn update_roles(
        db: &PgPool,
        id: Uuid,
        roles: Vec<String>,
    ) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET roles = $1, updated_at = NOW()
             WHERE id = $2
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&roles)
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("User with id {} not found", id)))
    }

    #[instrument(skip_all, fields(%id))]
    pub async fn resend_confirmation(
        db: &PgPool,
        id: Uuid,
        token_service: &TokenService,
        email_service: &EmailService,
    ) -> Result<(), AppError> {
        let user = Self::get_user(db, id).await?;

        if user.email_confirmed {
            return Err(AppError::bad_request(anyhow!("Email is already confirmed")));
        }

        let token = token_service.create_purpose_token(
            user.id,
            &user.email,
            TokenPurpose::EmailConfirmation,
        )?;

        email_service
            .send_confirmation_email(&user.email, &user.display_name, &token)
            .await
    }
}
