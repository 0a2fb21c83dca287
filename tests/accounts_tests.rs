use axum::http::StatusCode;
use restaurant_orders::{
    AppConfig, InMemoryRepository, Repository, accounts, auth,
    models::{
        CreateUserRequest, LoginRequest, NewOrder, OrderStatus, RoleType, SignupRequest,
        UpdateUserRequest,
    },
};

// --- Fixtures ---

fn create_request(email: &str, role_ids: Vec<i64>) -> CreateUserRequest {
    CreateUserRequest {
        username: "staffer".to_string(),
        email: email.to_string(),
        password: "s3cret-pass".to_string(),
        first_name: "Sam".to_string(),
        last_name: "Staff".to_string(),
        address: "1 Kitchen Lane".to_string(),
        phone: "555-0100".to_string(),
        role_ids,
    }
}

fn signup_request(email: &str) -> SignupRequest {
    SignupRequest {
        username: "guest".to_string(),
        email: email.to_string(),
        password: "hunter22".to_string(),
        first_name: "Gale".to_string(),
        last_name: "Guest".to_string(),
        address: String::new(),
        phone: String::new(),
        role_ids: None,
    }
}

// --- User / Role Relationship ---

#[tokio::test]
async fn test_create_user_with_unknown_role_persists_nothing() {
    let repo = InMemoryRepository::with_default_roles();

    let err = accounts::create_user(&repo, create_request("a@example.com", vec![1, 9999]))
        .await
        .unwrap_err();

    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert!(repo.list_users().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_user_collapses_duplicate_role_ids() {
    let repo = InMemoryRepository::with_default_roles();

    let user = accounts::create_user(&repo, create_request("b@example.com", vec![2, 2, 1]))
        .await
        .unwrap();

    let mut roles = user.role_types();
    roles.sort();
    assert_eq!(roles, vec![RoleType::Admin, RoleType::Employee]);
    assert!(auth::verify_password(&user.password_hash, "s3cret-pass"));
}

#[tokio::test]
async fn test_create_user_requires_a_role_and_a_unique_email() {
    let repo = InMemoryRepository::with_default_roles();

    let no_roles = accounts::create_user(&repo, create_request("c@example.com", vec![]))
        .await
        .unwrap_err();
    assert_eq!(no_roles.status(), StatusCode::BAD_REQUEST);

    accounts::create_user(&repo, create_request("c@example.com", vec![2]))
        .await
        .unwrap();
    let duplicate = accounts::create_user(&repo, create_request("c@example.com", vec![2]))
        .await
        .unwrap_err();
    assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_signup_always_yields_a_customer() {
    let repo = InMemoryRepository::with_default_roles();
    let mut request = signup_request("guest@example.com");
    request.role_ids = Some(vec![1]);

    let user = accounts::signup(&repo, request).await.unwrap();

    assert_eq!(user.role_types(), vec![RoleType::Customer]);
}

#[tokio::test]
async fn test_login_issues_token_with_role_claims() {
    let repo = InMemoryRepository::with_default_roles();
    let config = AppConfig::default();
    accounts::signup(&repo, signup_request("login@example.com"))
        .await
        .unwrap();

    let token = accounts::login(
        &repo,
        &config,
        LoginRequest {
            email: "login@example.com".to_string(),
            password: "hunter22".to_string(),
        },
    )
    .await
    .unwrap();

    let claims = auth::decode_token(&config, &token.access_token).unwrap();
    assert_eq!(claims.roles, vec!["customer".to_string()]);
    assert_eq!(claims.token_type, "bearer");
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let repo = InMemoryRepository::with_default_roles();
    let config = AppConfig::default();
    accounts::signup(&repo, signup_request("who@example.com"))
        .await
        .unwrap();

    let wrong_password = accounts::login(
        &repo,
        &config,
        LoginRequest {
            email: "who@example.com".to_string(),
            password: "nope".to_string(),
        },
    )
    .await
    .unwrap_err();
    let unknown_email = accounts::login(
        &repo,
        &config,
        LoginRequest {
            email: "nobody@example.com".to_string(),
            password: "hunter22".to_string(),
        },
    )
    .await
    .unwrap_err();

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
}

#[tokio::test]
async fn test_update_user_replaces_roles_and_keeps_unset_fields() {
    let repo = InMemoryRepository::with_default_roles();
    let user = accounts::create_user(&repo, create_request("d@example.com", vec![3]))
        .await
        .unwrap();

    let updated = accounts::update_user(
        &repo,
        user.id,
        UpdateUserRequest {
            phone: Some("555-0199".to_string()),
            role_ids: Some(vec![2]),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.phone, "555-0199");
    assert_eq!(updated.first_name, "Sam");
    assert_eq!(updated.password_hash, user.password_hash);
    assert_eq!(updated.role_types(), vec![RoleType::Employee]);
}

#[tokio::test]
async fn test_update_user_rejects_email_of_another_user() {
    let repo = InMemoryRepository::with_default_roles();
    accounts::create_user(&repo, create_request("taken@example.com", vec![3]))
        .await
        .unwrap();
    let user = accounts::create_user(&repo, create_request("mine@example.com", vec![3]))
        .await
        .unwrap();

    let err = accounts::update_user(
        &repo,
        user.id,
        UpdateUserRequest {
            email: Some("taken@example.com".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);

    // Re-submitting one's own email is fine.
    let same = accounts::update_user(
        &repo,
        user.id,
        UpdateUserRequest {
            email: Some("mine@example.com".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(same.is_some());
}

#[tokio::test]
async fn test_delete_user_is_restricted_while_orders_exist() {
    let repo = InMemoryRepository::with_default_roles();
    let user = accounts::create_user(&repo, create_request("e@example.com", vec![3]))
        .await
        .unwrap();
    repo.create_order(NewOrder {
        client_id: user.id,
        total_price: 9.0,
        status: OrderStatus::Created,
        created_at: chrono::Utc::now(),
    })
    .await
    .unwrap();

    let err = accounts::delete_user(&repo, user.id).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::CONFLICT);
    assert!(repo.get_user(user.id).await.unwrap().is_some());
}

// --- Roles ---

#[tokio::test]
async fn test_role_types_are_unique() {
    let repo = InMemoryRepository::with_default_roles();

    let err = accounts::create_role(&repo, RoleType::Admin).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_held_role_can_be_neither_changed_nor_deleted() {
    let repo = InMemoryRepository::with_default_roles();
    accounts::create_user(&repo, create_request("f@example.com", vec![2]))
        .await
        .unwrap();
    // Free the admin type so the rename itself would be legal.
    assert!(accounts::delete_role(&repo, 1).await.unwrap());

    let update = accounts::update_role(&repo, 2, RoleType::Admin).await.unwrap_err();
    assert_eq!(update.status(), StatusCode::CONFLICT);

    let delete = accounts::delete_role(&repo, 2).await.unwrap_err();
    assert_eq!(delete.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_unheld_role_can_be_retyped() {
    let repo = InMemoryRepository::with_default_roles();
    assert!(accounts::delete_role(&repo, 1).await.unwrap());

    let role = accounts::update_role(&repo, 3, RoleType::Admin)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(role.role_type, RoleType::Admin);

    assert!(accounts::update_role(&repo, 99, RoleType::Admin).await.unwrap().is_none());
}
