use axum::{
    extract::FromRequestParts,
    http::{Method, Request, StatusCode, Uri, header, request::Parts},
};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use restaurant_orders::{
    AppConfig, AppError, AppState, InMemoryRepository,
    auth::{self, ADMIN_ONLY, AuthUser, Claims, STAFF},
    models::RoleType,
};
use std::{sync::Arc, time::SystemTime};
use uuid::Uuid;

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";
const TEST_USER_ID: i64 = 42;

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Hand-signs a token so expiry and signing key can be forced.
fn create_token(roles: &[&str], exp: u64, secret: &str) -> String {
    let claims = Claims {
        user_id: TEST_USER_ID,
        roles: roles.iter().map(|r| r.to_string()).collect(),
        token_type: "bearer".to_string(),
        exp: exp as usize,
        iat: now_secs() as usize,
        jti: Uuid::new_v4(),
    };
    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::new(Algorithm::HS256), &claims, &key).unwrap()
}

fn create_app_state() -> AppState {
    let mut config = AppConfig::default();
    config.jwt_secret = TEST_JWT_SECRET.to_string();

    AppState {
        repo: Arc::new(InMemoryRepository::with_default_roles()),
        config,
    }
}

fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

fn parts_with_auth(value: &str) -> Parts {
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(value).unwrap(),
    );
    parts
}

fn assert_unauthorized(result: Result<AuthUser, AppError>) {
    match result {
        Err(err) => assert_eq!(err.status(), StatusCode::UNAUTHORIZED),
        Ok(user) => panic!("expected 401, got {user:?}"),
    }
}

// --- Extractor ---

#[tokio::test]
async fn test_auth_success_with_valid_jwt() {
    let token = create_token(&["employee"], now_secs() + 3600, TEST_JWT_SECRET);
    let app_state = create_app_state();

    let mut parts = parts_with_auth(&format!("Bearer {token}"));
    let user = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap();

    assert_eq!(user.id, TEST_USER_ID);
    assert_eq!(user.roles, vec![RoleType::Employee]);
}

#[tokio::test]
async fn test_auth_ignores_unknown_role_strings() {
    let token = create_token(&["customer", "superuser"], now_secs() + 3600, TEST_JWT_SECRET);
    let app_state = create_app_state();

    let mut parts = parts_with_auth(&format!("Bearer {token}"));
    let user = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap();

    assert_eq!(user.roles, vec![RoleType::Customer]);
}

#[tokio::test]
async fn test_auth_failure_with_missing_header() {
    let app_state = create_app_state();
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());

    assert_unauthorized(AuthUser::from_request_parts(&mut parts, &app_state).await);
}

#[tokio::test]
async fn test_auth_failure_with_wrong_scheme() {
    let token = create_token(&["admin"], now_secs() + 3600, TEST_JWT_SECRET);
    let app_state = create_app_state();

    let mut parts = parts_with_auth(&format!("Basic {token}"));
    assert_unauthorized(AuthUser::from_request_parts(&mut parts, &app_state).await);
}

#[tokio::test]
async fn test_auth_failure_with_expired_jwt() {
    // Past the default 60 second leeway.
    let token = create_token(&["admin"], now_secs() - 120, TEST_JWT_SECRET);
    let app_state = create_app_state();

    let mut parts = parts_with_auth(&format!("Bearer {token}"));
    assert_unauthorized(AuthUser::from_request_parts(&mut parts, &app_state).await);
}

#[tokio::test]
async fn test_auth_failure_with_foreign_signature() {
    let token = create_token(&["admin"], now_secs() + 3600, "some-other-secret-value");
    let app_state = create_app_state();

    let mut parts = parts_with_auth(&format!("Bearer {token}"));
    assert_unauthorized(AuthUser::from_request_parts(&mut parts, &app_state).await);
}

#[tokio::test]
async fn test_issued_token_round_trips_through_extractor() {
    let app_state = create_app_state();
    let issued = auth::issue_token(
        &app_state.config,
        7,
        &[RoleType::Admin, RoleType::Customer],
    )
    .unwrap();
    assert_eq!(issued.token_type, "bearer");

    let claims = auth::decode_token(&app_state.config, &issued.access_token).unwrap();
    assert_eq!(claims.user_id, 7);
    assert_eq!(claims.roles, vec!["admin".to_string(), "customer".to_string()]);

    let mut parts = parts_with_auth(&format!("Bearer {}", issued.access_token));
    let user = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap();
    assert_eq!(user.id, 7);
}

#[tokio::test]
async fn test_token_signed_with_other_hmac_variant_is_rejected() {
    let mut config = AppConfig::default();
    config.jwt_algorithm = Algorithm::HS512;
    let issued = auth::issue_token(&config, 1, &[RoleType::Admin]).unwrap();

    config.jwt_algorithm = Algorithm::HS256;
    let err = auth::decode_token(&config, &issued.access_token).unwrap_err();
    assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
}

// --- Role Gate ---

#[test]
fn test_customer_is_forbidden_from_staff_operations() {
    let customer = AuthUser {
        id: 1,
        roles: vec![RoleType::Customer],
    };
    let err = customer.require_any(STAFF).unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);
}

#[test]
fn test_employee_is_staff_but_not_admin() {
    let employee = AuthUser {
        id: 2,
        roles: vec![RoleType::Employee],
    };
    assert!(employee.require_any(STAFF).is_ok());
    assert_eq!(
        employee.require_any(ADMIN_ONLY).unwrap_err().status(),
        StatusCode::FORBIDDEN
    );
}

#[test]
fn test_owner_passes_self_or_staff_check() {
    let customer = AuthUser {
        id: 5,
        roles: vec![RoleType::Customer],
    };
    assert!(customer.require_self_or_any(5, STAFF).is_ok());
    assert!(customer.require_self_or_any(6, STAFF).is_err());
}

#[test]
fn test_roles_permitted_is_a_set_intersection() {
    assert!(auth::roles_permitted(
        &[RoleType::Customer, RoleType::Admin],
        ADMIN_ONLY
    ));
    assert!(!auth::roles_permitted(&[], STAFF));
}

// --- Passwords ---

#[test]
fn test_password_hash_and_verify() {
    let hash = auth::hash_password("correct horse").unwrap();

    assert!(hash.starts_with("$argon2"));
    assert!(auth::verify_password(&hash, "correct horse"));
    assert!(!auth::verify_password(&hash, "battery staple"));
    assert!(!auth::verify_password("not-a-phc-string", "correct horse"));
}

#[test]
fn test_password_hashes_are_salted() {
    let first = auth::hash_password("same password").unwrap();
    let second = auth::hash_password("same password").unwrap();
    assert_ne!(first, second);
}
