use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::model::RefreshTokenRecord;
use crate::utils::errors::AppError;

/// Persistence contract for refresh tokens: one row per user, keyed by the
/// user id. `save` has upsert semantics and the backing store must make the
/// upsert atomic, so concurrent sign-ins for the same user resolve to
/// last-writer-wins rather than a duplicate-key failure.
#[allow(async_fn_in_trait)]
pub trait RefreshTokenStore: Clone + Send + Sync + 'static {
    async fn find_by_user_id(&self, user_id: Uuid)
    -> Result<Option<RefreshTokenRecord>, AppError>;

    async fn save(&self, record: &RefreshTokenRecord) -> Result<(), AppError>;

    async fn delete_by_user_id(&self, user_id: Uuid) -> Result<(), AppError>;
}

/// Postgres-backed store over the `refresh_tokens` table.
#[derive(Clone, Debug)]
pub struct PgRefreshTokenStore {
    pool: PgPool,
}

impl PgRefreshTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl RefreshTokenStore for PgRefreshTokenStore {
    async fn find_by_user_id(
        &self,
        user_id: Uuid,
    ) -> Result<Option<RefreshTokenRecord>, AppError> {
        let record = sqlx::query_as::<_, RefreshTokenRecord>(
            "SELECT user_id, token_value, expires_at FROM refresh_tokens WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch refresh token")
        .map_err(AppError::database)?;

        Ok(record)
    }

    async fn save(&self, record: &RefreshTokenRecord) -> Result<(), AppError> {
        // ON CONFLICT keeps the upsert atomic under racing sign-ins.
        sqlx::query(
            "INSERT INTO refresh_tokens (user_id, token_value, expires_at)
             VALUES ($1, $2, $3)
             ON CONFLICT (user_id)
             DO UPDATE SET token_value = EXCLUDED.token_value, expires_at = EXCLUDED.expires_at",
        )
        .bind(record.user_id)
        .bind(&record.token_value)
        .bind(record.expires_at)
        .execute(&self.pool)
        .await
        .context("Failed to save refresh token")
        .map_err(AppError::database)?;

        Ok(())
    }

    async fn delete_by_user_id(&self, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .context("Failed to delete refresh token")
            .map_err(AppError::database)?;

        Ok(())
    }
}

#[cfg(test)]
pub mod memory {
    //! In-memory store used by the unit tests; same contract, no database.

    use std::collections::HashMap;
    use std::sync::Arc;

    use tokio::sync::RwLock;
    use uuid::Uuid;

    use super::{AppError, RefreshTokenRecord, RefreshTokenStore};

    #[derive(Clone, Default)]
    pub struct MemoryRefreshTokenStore {
        records: Arc<RwLock<HashMap<Uuid, RefreshTokenRecord>>>,
    }

    impl MemoryRefreshTokenStore {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl RefreshTokenStore for MemoryRefreshTokenStore {
        async fn find_by_user_id(
            &self,
            user_id: Uuid,
        ) -> Result<Option<RefreshTokenRecord>, AppError> {
            Ok(self.records.read().await.get(&user_id).cloned())
        }

        async fn save(&self, record: &RefreshTokenRecord) -> Result<(), AppError> {
            self.records
                .write()
                .await
                .insert(record.user_id, record.clone());
            Ok(())
        }

        async fn delete_by_user_id(&self, user_id: Uuid) -> Result<(), AppError> {
            self.records.write().await.remove(&user_id);
            Ok(())
        }
    }
}
