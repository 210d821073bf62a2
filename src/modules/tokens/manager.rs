use anyhow::anyhow;
use chrono::{Duration, Utc};
use rand::RngCore;
use uuid::Uuid;

use super::model::RefreshTokenRecord;
use super::store::RefreshTokenStore;
use crate::modules::auth::model::Principal;
use crate::utils::errors::AppError;

/// Business rules for the refresh-token lifecycle: creation, validation and
/// clearing. Owns the expiry policy; persistence is delegated to the store.
#[derive(Clone, Debug)]
pub struct RefreshTokenManager<S: RefreshTokenStore> {
    store: S,
    lifetime_hours: i64,
}

impl<S: RefreshTokenStore> RefreshTokenManager<S> {
    pub fn new(store: S, lifetime_hours: i64) -> Self {
        Self {
            store,
            lifetime_hours,
        }
    }

    /// Creates and persists a refresh token for the principal.
    ///
    /// The upsert overwrites any previous token for that user: one live
    /// refresh token per user is the intended single-session policy, so a
    /// sign-in on a second device invalidates the first device's token.
    ///
    /// A principal without a parseable subject claim is a broken upstream
    /// principal and a hard error, not an authentication failure.
    pub async fn create_token(&self, principal: &Principal) -> Result<RefreshTokenRecord, AppError> {
        let user_id = Uuid::parse_str(&principal.subject).map_err(|_| {
            AppError::internal(anyhow!("Principal is missing a usable subject identity claim"))
        })?;

        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);

        let record = RefreshTokenRecord {
            user_id,
            token_value: hex::encode(bytes),
            expires_at: Utc::now() + Duration::hours(self.lifetime_hours),
        };

        self.store.save(&record).await?;

        Ok(record)
    }

    /// Returns true iff the presented value matches the stored value for
    /// this user and the stored token has not expired. A token whose expiry
    /// equals the current instant is already expired.
    ///
    /// Failures have no side effects: an expired row stays in place and is
    /// simply overwritten by the next issuance.
    pub async fn validate(&self, user_id: Uuid, presented: &str) -> Result<bool, AppError> {
        let Some(record) = self.store.find_by_user_id(user_id).await? else {
            return Ok(false);
        };

        Ok(record.token_value == presented && record.expires_at > Utc::now())
    }

    /// Deletes the stored token for the user. A `None` user id and an
    /// absent row are both no-ops, which makes sign-out idempotent.
    pub async fn clear_token(&self, user_id: Option<Uuid>) -> Result<(), AppError> {
        match user_id {
            Some(id) => self.store.delete_by_user_id(id).await,
            None => Ok(()),
        }
    }
}
