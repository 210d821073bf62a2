use signet::config::auth::AuthConfig;
use signet::config::cors::CorsConfig;
use signet::config::email::EmailConfig;
use signet::modules::auth::protocol::SignInProtocol;
use signet::modules::maintenance::service::MaintenanceFlag;
use signet::modules::tokens::manager::RefreshTokenManager;
use signet::modules::tokens::store::PgRefreshTokenStore;
use signet::router::init_router;
use signet::state::AppState;
use signet::utils::email::EmailService;
use signet::utils::jwt::TokenService;
use signet::utils::password::hash_password;
use sqlx::PgPool;
use uuid::Uuid;

fn test_auth_config() -> AuthConfig {
    AuthConfig {
        signing_key: "test_signing_key_for_integration_tests".to_string(),
        issuer: "signet".to_string(),
        audience: "signet-clients".to_string(),
        access_token_minutes: 30,
        refresh_token_hours: 72,
    }
}

fn test_email_config() -> EmailConfig {
    EmailConfig {
        enabled: false,
        smtp_host: "localhost".to_string(),
        smtp_port: 1025,
        smtp_username: String::new(),
        smtp_password: String::new(),
        from_email: "noreply@signet.test".to_string(),
        from_name: "Signet".to_string(),
        client_base_url: "http://localhost:5173".to_string(),
    }
}

/// Builds the app and its state without touching the environment. The
/// state is returned alongside the router so tests can flip the shared
/// maintenance flag.
pub fn setup_test_app(pool: PgPool) -> (axum::Router, AppState) {
    let auth_config = test_auth_config();

    let store = PgRefreshTokenStore::new(pool.clone());
    let tokens = RefreshTokenManager::new(store, auth_config.refresh_token_hours);
    let protocol = SignInProtocol::new(TokenService::new(auth_config), tokens);

    let state = AppState {
        db: pool,
        cors_config: CorsConfig {
            allowed_origins: vec!["http://localhost:5173".to_string()],
        },
        protocol,
        email_service: EmailService::new(test_email_config()),
        maintenance: MaintenanceFlag::new(false),
    };

    (init_router(state.clone()), state)
}

#[allow(dead_code)]
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub password: String,
}

pub async fn create_test_user(
    pool: &PgPool,
    email: &str,
    password: &str,
    roles: &[&str],
) -> TestUser {
    let hashed = hash_password(password).unwrap();
    let roles: Vec<String> = roles.iter().map(|r| r.to_string()).collect();

    let id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO users (email, password, display_name, roles)
         VALUES ($1, $2, $3, $4)
         RETURNING id",
    )
    .bind(email)
    .bind(&hashed)
    .bind("Test User")
    .bind(&roles)
    .fetch_one(pool)
    .await
    .unwrap();

    TestUser {
        id,
        email: email.to_string(),
        password: password.to_string(),
    }
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}
