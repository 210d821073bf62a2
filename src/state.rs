use sqlx::PgPool;

use crate::config::auth::AuthConfig;
use crate::config::cors::CorsConfig;
use crate::config::database::init_db_pool;
use crate::config::email::EmailConfig;
use crate::modules::auth::protocol::SignInProtocol;
use crate::modules::maintenance::service::{MaintenanceFlag, MaintenanceService};
use crate::modules::tokens::manager::RefreshTokenManager;
use crate::modules::tokens::store::PgRefreshTokenStore;
use crate::utils::email::EmailService;
use crate::utils::jwt::TokenService;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cors_config: CorsConfig,
    pub protocol: SignInProtocol<PgRefreshTokenStore>,
    pub email_service: EmailService,
    pub maintenance: MaintenanceFlag,
}

pub async fn init_app_state() -> AppState {
    let db = init_db_pool().await;
    let auth_config = AuthConfig::from_env();

    let store = PgRefreshTokenStore::new(db.clone());
    let tokens = RefreshTokenManager::new(store, auth_config.refresh_token_hours);
    let protocol = SignInProtocol::new(TokenService::new(auth_config), tokens);

    let maintenance = MaintenanceService::load(&db).await;

    AppState {
        db,
        cors_config: CorsConfig::from_env(),
        protocol,
        email_service: EmailService::new(EmailConfig::from_env()),
        maintenance,
    }
}
