use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::model::MaintenanceStatusResponse;
use crate::utils::errors::AppError;

/// In-process cache of the persisted maintenance flag, checked on every
/// request by the maintenance gate without a database round-trip.
#[derive(Clone, Debug, Default)]
pub struct MaintenanceFlag(Arc<AtomicBool>);

impl MaintenanceFlag {
    pub fn new(enabled: bool) -> Self {
        Self(Arc::new(AtomicBool::new(enabled)))
    }

    pub fn is_enabled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set(&self, enabled: bool) {
        self.0.store(enabled, Ordering::Relaxed);
    }
}

pub struct MaintenanceService;

#[derive(sqlx::FromRow)]
struct SettingsRow {
    maintenance_enabled: bool,
    maintenance_reason: Option<String>,
    updated_at: DateTime<Utc>,
}

impl MaintenanceService {
    /// Loads the persisted flag at startup. Failures default to disabled
    /// rather than blocking boot.
    pub async fn load(db: &PgPool) -> MaintenanceFlag {
        match sqlx::query_scalar::<_, bool>(
            "SELECT maintenance_enabled FROM system_settings WHERE id = 1",
        )
        .fetch_optional(db)
        .await
        {
            Ok(Some(enabled)) => {
                tracing::info!(enabled, "maintenance mode initialized");
                MaintenanceFlag::new(enabled)
            }
            Ok(None) => MaintenanceFlag::new(false),
            Err(e) => {
                tracing::error!(error = %e, "failed to load maintenance flag, defaulting to disabled");
                MaintenanceFlag::new(false)
            }
        }
    }

    pub async fn status(db: &PgPool) -> Result<MaintenanceStatusResponse, AppError> {
        let row = sqlx::query_as::<_, SettingsRow>(
            "SELECT maintenance_enabled, maintenance_reason, updated_at
             FROM system_settings WHERE id = 1",
        )
        .fetch_optional(db)
        .await?;

        Ok(match row {
            Some(row) => MaintenanceStatusResponse {
                enabled: row.maintenance_enabled,
                reason: row.maintenance_reason,
                updated_at: row.updated_at,
            },
            None => MaintenanceStatusResponse {
                enabled: false,
                reason: None,
                updated_at: Utc::now(),
            },
        })
    }

    pub async fn set(
        db: &PgPool,
        flag: &MaintenanceFlag,
        enabled: bool,
        reason: Option<String>,
        changed_by: &str,
    ) -> Result<MaintenanceStatusResponse, AppError> {
        let row = sqlx::query_as::<_, SettingsRow>(
            "INSERT INTO system_settings (id, maintenance_enabled, maintenance_reason, updated_at)
             VALUES (1, $1, $2, NOW())
             ON CONFLICT (id)
             DO UPDATE SET maintenance_enabled = $1, maintenance_reason = $2, updated_at = NOW()
             RETURNING maintenance_enabled, maintenance_reason, updated_at",
        )
        .bind(enabled)
        .bind(&reason)
        .fetch_one(db)
        .await?;

        flag.set(enabled);

        if enabled {
            tracing::warn!(changed_by, reason = ?reason, "maintenance mode ENABLED");
        } else {
            tracing::info!(changed_by, "maintenance mode disabled");
        }

        Ok(MaintenanceStatusResponse {
            enabled: row.maintenance_enabled,
            reason: row.maintenance_reason,
            updated_at: row.updated_at,
        })
    }
}
