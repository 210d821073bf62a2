use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::modules::auth::model::Principal;

/// A user row, minus the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub roles: Vec<String>,
    pub email_confirmed: bool,
    pub lockout_end: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether the account is currently locked out.
    pub fn is_locked_out(&self) -> bool {
        self.lockout_end.is_some_and(|until| until > Utc::now())
    }

    /// The claim material tokens are minted from.
    pub fn principal(&self) -> Principal {
        Principal {
            subject: self.id.to_string(),
            email: self.email.clone(),
            roles: self.roles.clone(),
        }
    }
}

/// Query parameters for the admin user listing.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UserFilterParams {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetLockoutRequest {
    /// Lockout end timestamp; `null` lifts the lockout.
    pub until: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRolesRequest {
    /// Replaces the user's role set.
    pub roles: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedUsersResponse {
    pub data: Vec<User>,
    pub meta: crate::utils::pagination::PaginationMeta,
}
