use std::env;

/// Token issuance configuration.
///
/// Access tokens live for minutes, refresh tokens for hours. Issuer and
/// audience are stamped into every token and validated on the way back in.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub signing_key: String,
    pub issuer: String,
    pub audience: String,
    pub access_token_minutes: i64,
    pub refresh_token_hours: i64,
}

impl AuthConfig {
    /// Loads the configuration from the environment.
    ///
    /// # Panics
    ///
    /// Panics if `AUTH_SIGNING_KEY` is not set. A missing signing key is a
    /// deployment error, not something to surface to API clients.
    pub fn from_env() -> Self {
        Self {
            signing_key: env::var("AUTH_SIGNING_KEY")
                .expect("AUTH_SIGNING_KEY must be set"),
            issuer: env::var("AUTH_ISSUER").unwrap_or_else(|_| "signet".to_string()),
            audience: env::var("AUTH_AUDIENCE").unwrap_or_else(|_| "signet-clients".to_string()),
            access_token_minutes: env::var("AUTH_ACCESS_TOKEN_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            refresh_token_hours: env::var("AUTH_REFRESH_TOKEN_HOURS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(72),
        }
    }
}
