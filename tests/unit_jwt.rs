use chrono::{Duration, Utc};
use signet::config::auth::AuthConfig;
use signet::modules::auth::model::Principal;
use signet::modules::tokens::model::RefreshTokenRecord;
use signet::utils::jwt::{TokenPurpose, TokenService};
use uuid::Uuid;

fn get_test_auth_config() -> AuthConfig {
    AuthConfig {
        signing_key: "test_signing_key_for_testing_purposes".to_string(),
        issuer: "signet".to_string(),
        audience: "signet-clients".to_string(),
        access_token_minutes: 30,
        refresh_token_hours: 72,
    }
}

fn test_principal() -> Principal {
    Principal {
        subject: Uuid::new_v4().to_string(),
        email: "test@example.com".to_string(),
        roles: vec!["user".to_string()],
    }
}

#[test]
fn test_access_token_round_trip() {
    let service = TokenService::new(get_test_auth_config());
    let principal = test_principal();

    let (token, expires_at) = service.create_access_token(&principal).unwrap();
    assert!(!token.is_empty());
    assert!(expires_at > Utc::now());

    let claims = service.verify_access_token(&token).unwrap();
    assert_eq!(claims.sub, principal.subject);
    assert_eq!(claims.email, principal.email);
    assert_eq!(claims.roles, principal.roles);
    assert_eq!(claims.iss, "signet");
    assert_eq!(claims.aud, "signet-clients");
}

#[test]
fn test_access_token_expiry_matches_config() {
    let service = TokenService::new(get_test_auth_config());

    let (token, _) = service.create_access_token(&test_principal()).unwrap();
    let claims = service.verify_access_token(&token).unwrap();

    assert_eq!(claims.exp - claims.iat, 30 * 60);
}

#[test]
fn test_verify_access_token_wrong_key() {
    let service = TokenService::new(get_test_auth_config());
    let (token, _) = service.create_access_token(&test_principal()).unwrap();

    let mut other_config = get_test_auth_config();
    other_config.signing_key = "a_completely_different_key".to_string();
    let other_service = TokenService::new(other_config);

    assert!(other_service.verify_access_token(&token).is_err());
}

#[test]
fn test_verify_access_token_wrong_issuer() {
    let service = TokenService::new(get_test_auth_config());
    let (token, _) = service.create_access_token(&test_principal()).unwrap();

    let mut other_config = get_test_auth_config();
    other_config.issuer = "someone-else".to_string();
    let other_service = TokenService::new(other_config);

    assert!(other_service.verify_access_token(&token).is_err());
}

#[test]
fn test_verify_access_token_wrong_audience() {
    let service = TokenService::new(get_test_auth_config());
    let (token, _) = service.create_access_token(&test_principal()).unwrap();

    let mut other_config = get_test_auth_config();
    other_config.audience = "other-clients".to_string();
    let other_service = TokenService::new(other_config);

    assert!(other_service.verify_access_token(&token).is_err());
}

#[test]
fn test_verify_access_token_malformed() {
    let service = TokenService::new(get_test_auth_config());
    let malformed_tokens = vec![
        "",
        "not.enough.parts",
        "too.many.parts.here.extra",
        "!!!.invalid.chars",
        "header.payload.",
        ".payload.signature",
    ];

    for token in malformed_tokens {
        assert!(service.verify_access_token(token).is_err());
    }
}

#[test]
fn test_refresh_envelope_carries_subject_and_value() {
    let service = TokenService::new(get_test_auth_config());
    let record = RefreshTokenRecord {
        user_id: Uuid::new_v4(),
        token_value: "a1b2c3d4".to_string(),
        expires_at: Utc::now() + Duration::hours(72),
    };

    let (token, expires_at) = service.create_refresh_bearer_token(&record).unwrap();
    assert_eq!(expires_at, record.expires_at);

    let claims = service.verify_refresh_bearer_token(&token).unwrap();
    assert_eq!(claims.sub, record.user_id.to_string());
    assert_eq!(claims.rft, record.token_value);
    assert_eq!(claims.exp, record.expires_at.timestamp() as usize);
}

#[test]
fn test_refresh_envelope_expiry_mirrors_record() {
    // the envelope of an expired record must itself be rejected; use an
    // expiry well past the decoder's leeway
    let service = TokenService::new(get_test_auth_config());
    let record = RefreshTokenRecord {
        user_id: Uuid::new_v4(),
        token_value: "a1b2c3d4".to_string(),
        expires_at: Utc::now() - Duration::hours(2),
    };

    let (token, _) = service.create_refresh_bearer_token(&record).unwrap();
    assert!(service.verify_refresh_bearer_token(&token).is_err());
}

#[test]
fn test_access_and_refresh_tokens_are_not_interchangeable() {
    let service = TokenService::new(get_test_auth_config());

    let (access, _) = service.create_access_token(&test_principal()).unwrap();
    assert!(service.verify_refresh_bearer_token(&access).is_err());

    let record = RefreshTokenRecord {
        user_id: Uuid::new_v4(),
        token_value: "a1b2c3d4".to_string(),
        expires_at: Utc::now() + Duration::hours(72),
    };
    let (refresh, _) = service.create_refresh_bearer_token(&record).unwrap();
    assert!(service.verify_access_token(&refresh).is_err());
}

#[test]
fn test_purpose_token_round_trip() {
    let service = TokenService::new(get_test_auth_config());
    let user_id = Uuid::new_v4();

    let token = service
        .create_purpose_token(user_id, "test@example.com", TokenPurpose::PasswordReset)
        .unwrap();

    let claims = service
        .verify_purpose_token(&token, TokenPurpose::PasswordReset)
        .unwrap();
    assert_eq!(claims.sub, user_id.to_string());
    assert_eq!(claims.email, "test@example.com");
}

#[test]
fn test_purpose_token_rejects_wrong_purpose() {
    let service = TokenService::new(get_test_auth_config());

    let token = service
        .create_purpose_token(
            Uuid::new_v4(),
            "test@example.com",
            TokenPurpose::PasswordReset,
        )
        .unwrap();

    assert!(
        service
            .verify_purpose_token(&token, TokenPurpose::EmailConfirmation)
            .is_err()
    );
}

#[test]
fn test_different_principals_different_tokens() {
    let service = TokenService::new(get_test_auth_config());

    let first = test_principal();
    let second = test_principal();

    let (token1, _) = service.create_access_token(&first).unwrap();
    let (token2, _) = service.create_access_token(&second).unwrap();
    assert_ne!(token1, token2);

    let claims1 = service.verify_access_token(&token1).unwrap();
    let claims2 = service.verify_access_token(&token2).unwrap();
    assert_eq!(claims1.sub, first.subject);
    assert_eq!(claims2.sub, second.subject);
}
