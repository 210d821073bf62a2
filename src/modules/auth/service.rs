use anyhow::anyhow;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::users::model::User;
use crate::utils::email::EmailService;
use crate::utils::errors::AppError;
use crate::utils::jwt::{TokenPurpose, TokenService};
use crate::utils::password::{hash_password, verify_password};

use super::model::{
    ChangePasswordRequest, ConfirmEmailRequest, ForgotPasswordRequest, ResetPasswordRequest,
    SignUpRequest,
};

const USER_COLUMNS: &str =
    "id, email, display_name, roles, email_confirmed, lockout_end, last_login_at, created_at, updated_at";

pub struct AuthService;

impl AuthService {
    /// Registers a new account. Uniqueness is enforced by the database
    /// constraint alone, so two concurrent sign-ups for the same email
    /// resolve to one 201 and one 400 rather than a race.
    #[instrument(skip_all, fields(email = %dto.email))]
    pub async fn register_user(db: &PgPool, dto: SignUpRequest) -> Result<User, AppError> {
        let hashed_password = hash_password(&dto.password)?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password, display_name, roles)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&dto.email)
        .bind(&hashed_password)
        .bind(&dto.display_name)
        .bind(vec!["user".to_string()])
        .fetch_one(db)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::bad_request(anyhow!("Email already registered"))
            }
            _ => AppError::database(e),
        })?;

        Ok(user)
    }

    /// Checks email and password. Every failure mode, including a locked
    /// account and an unknown email, returns the same 401 so the response
    /// does not reveal whether the account exists.
    #[instrument(skip_all, fields(email = %email))]
    pub async fn verify_credentials(
        db: &PgPool,
        email: &str,
        password: &str,
    ) -> Result<User, AppError> {
        #[derive(sqlx::FromRow)]
        struct UserWithPassword {
            id: Uuid,
            email: String,
            password: String,
            display_name: String,
            roles: Vec<String>,
            email_confirmed: bool,
            lockout_end: Option<DateTime<Utc>>,
            last_login_at: Option<DateTime<Utc>>,
            created_at: DateTime<Utc>,
            updated_at: DateTime<Utc>,
        }

        let row = sqlx::query_as::<_, UserWithPassword>(
            "SELECT id, email, password, display_name, roles, email_confirmed,
                    lockout_end, last_login_at, created_at, updated_at
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::unauthorized(anyhow!("Invalid email or password")))?;

        if !verify_password(password, &row.password)? {
            return Err(AppError::unauthorized(anyhow!("Invalid email or password")));
        }

        let user = User {
            id: row.id,
            email: row.email,
            display_name: row.display_name,
            roles: row.roles,
            email_confirmed: row.email_confirmed,
            lockout_end: row.lockout_end,
            last_login_at: row.last_login_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        };

        if user.is_locked_out() {
            return Err(AppError::unauthorized(anyhow!("Invalid email or password")));
        }

        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;

        Ok(user)
    }

    /// Last-login side effect, run after a successful sign-in. Not part of
    /// the token core; callers treat a failure here as non-fatal.
    pub async fn record_login(db: &PgPool, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET last_login_at = NOW(), updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(db)
            .await?;

        Ok(())
    }

    /// Changes the password of an authenticated user after verifying the
    /// current one. A wrong current password is a 400, not a 401: the
    /// caller is already authenticated, the request body is what's wrong.
    #[instrument(skip_all, fields(%user_id))]
    pub async fn change_password(
        db: &PgPool,
        user_id: Uuid,
        dto: ChangePasswordRequest,
    ) -> Result<(), AppError> {
        let current_hash =
            sqlx::query_scalar::<_, String>("SELECT password FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(db)
                .await?
                .ok_or_else(|| {
                    AppError::not_found(anyhow!("User with id {} not found", user_id))
                })?;

        if !verify_password(&dto.password, &current_hash)? {
            return Err(AppError::bad_request(anyhow!("Current password is incorrect")));
        }

        let hashed = hash_password(&dto.new_password)?;

        sqlx::query("UPDATE users SET password = $1, updated_at = NOW() WHERE id = $2")
            .bind(&hashed)
            .bind(user_id)
            .execute(db)
            .await?;

        Ok(())
    }

    /// Always succeeds from the caller's point of view, whether or not the
    /// email matches an account.
    #[instrument(skip_all)]
    pub async fn forgot_password(
        db: &PgPool,
        dto: ForgotPasswordRequest,
        token_service: &TokenService,
        email_service: &EmailService,
    ) -> Result<(), AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(&dto.email)
        .fetch_optional(db)
        .await?;

        let Some(user) = user else {
            tracing::debug!("password reset requested for unknown email");
            return Ok(());
        };

        let token =
            token_service.create_purpose_token(user.id, &user.email, TokenPurpose::PasswordReset)?;

        email_service
            .send_password_reset_email(&user.email, &user.display_name, &token)
            .await
    }

    #[instrument(skip_all)]
    pub async fn reset_password(
        db: &PgPool,
        dto: ResetPasswordRequest,
        token_service: &TokenService,
    ) -> Result<(), AppError> {
        let claims = token_service.verify_purpose_token(&dto.token, TokenPurpose::PasswordReset)?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::bad_request(anyhow!("Invalid or expired token")))?;

        let hashed = hash_password(&dto.new_password)?;

        let result =
            sqlx::query("UPDATE users SET password = $1, updated_at = NOW() WHERE id = $2")
                .bind(&hashed)
                .bind(user_id)
                .execute(db)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::bad_request(anyhow!("Invalid or expired token")));
        }

        Ok(())
    }

    #[instrument(skip_all)]
    pub async fn confirm_email(
        db: &PgPool,
        dto: ConfirmEmailRequest,
        token_service: &TokenService,
    ) -> Result<(), AppError> {
        let claims =
            token_service.verify_purpose_token(&dto.token, TokenPurpose::EmailConfirmation)?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::bad_request(anyhow!("Invalid or expired token")))?;

        let result = sqlx::query(
            "UPDATE users SET email_confirmed = TRUE, updated_at = NOW() WHERE id = $1",
        )
        .bind(user_id)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::bad_request(anyhow!("Invalid or expired token")));
        }

        Ok(())
    }
}
