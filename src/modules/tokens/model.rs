use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A stored refresh token. At most one row exists per user: issuing a new
/// token for a user overwrites the previous one.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct RefreshTokenRecord {
    pub user_id: Uuid,
    pub token_value: String,
    pub expires_at: DateTime<Utc>,
}
