use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use restaurant_orders::{
    AppConfig, AppState, InMemoryRepository, auth, create_router, models::RoleType,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

// --- Harness ---

fn spawn_app() -> (Router, AppConfig) {
    let config = AppConfig::default();
    let state = AppState {
        repo: Arc::new(InMemoryRepository::with_default_roles()),
        config: config.clone(),
    };
    (create_router(state), config)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn staff_token(config: &AppConfig, role: RoleType) -> String {
    // The seeded user ids do not matter for staff-gated routes.
    auth::issue_token(config, 1000, &[role]).unwrap().access_token
}

async fn signup(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/users/signup",
        None,
        Some(json!({
            "username": email,
            "email": email,
            "password": "pa55word",
            "first_name": "Test",
            "last_name": "User",
            "address": "",
            "phone": ""
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "signup failed: {body}");
    body["access_token"].as_str().unwrap().to_string()
}

// --- Tests ---

#[tokio::test]
async fn test_health_check() {
    let (app, _) = spawn_app();
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let (app, _) = spawn_app();
    let (status, body) = send(&app, "GET", "/api-docs/openapi.json", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/orders/{id}/finalize_order"].is_object());
}

#[tokio::test]
async fn test_catalog_reads_are_public_and_writes_are_not() {
    let (app, config) = spawn_app();

    let (status, body) = send(&app, "GET", "/menus", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = send(
        &app,
        "POST",
        "/categories",
        None,
        Some(json!({"name": "desserts"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["detail"].is_string());

    let employee = staff_token(&config, RoleType::Employee);
    let (status, category) = send(
        &app,
        "POST",
        "/categories",
        Some(&employee),
        Some(json!({"name": "desserts"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(category["name"], "desserts");

    let uri = format!("/categories/{}", category["id"]);
    let (status, fetched) = send(&app, "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "desserts");
}

#[tokio::test]
async fn test_unauthenticated_and_forbidden_are_distinct() {
    let (app, config) = spawn_app();

    let (status, _) = send(&app, "GET", "/orders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/orders", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let customer = staff_token(&config, RoleType::Customer);
    let (status, _) = send(&app, "GET", "/orders", Some(&customer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_roles_are_admin_only() {
    let (app, config) = spawn_app();

    let employee = staff_token(&config, RoleType::Employee);
    let (status, _) = send(&app, "GET", "/roles", Some(&employee), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = staff_token(&config, RoleType::Admin);
    let (status, roles) = send(&app, "GET", "/roles", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(roles.as_array().unwrap().len(), 3);

    let (status, _) = send(
        &app,
        "POST",
        "/roles",
        Some(&admin),
        Some(json!({"role_type": "customer"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_signup_login_and_order_lifecycle() {
    let (app, config) = spawn_app();
    let employee = staff_token(&config, RoleType::Employee);

    // Catalog set up by staff.
    let (_, menu) = send(
        &app,
        "POST",
        "/menus",
        Some(&employee),
        Some(json!({"name": "Pizza", "price": 12.0, "description": "Margherita", "stock": 20})),
    )
    .await;
    let menu_id = menu["id"].as_i64().unwrap();

    // Customer signs up, then logs in again.
    signup(&app, "eve@example.com").await;
    let (status, login) = send(
        &app,
        "POST",
        "/users/login",
        None,
        Some(json!({"email": "eve@example.com", "password": "pa55word"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["token_type"], "bearer");
    let token = login["access_token"].as_str().unwrap().to_string();
    let claims = auth::decode_token(&config, &token).unwrap();
    assert_eq!(claims.roles, vec!["customer".to_string()]);

    // Order with one cancelled and one live line item.
    let (status, order) = send(
        &app,
        "POST",
        "/orders",
        Some(&token),
        Some(json!({"client_id": claims.user_id, "total_price": 1.0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["status"], "Created");
    let order_id = order["id"].as_i64().unwrap();

    for (quantity, status) in [(3, "Created"), (1, "Cancelled")] {
        let (code, detail) = send(
            &app,
            "POST",
            "/orderdetails",
            Some(&token),
            Some(json!({
                "order_id": order_id,
                "menu_id": menu_id,
                "quantity": quantity,
                "status": status
            })),
        )
        .await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(detail["price"], 12.0);
    }

    let (_, details) = send(
        &app,
        "GET",
        &format!("/orders/{order_id}/details"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(details.as_array().unwrap().len(), 2);

    let (_, total) = send(
        &app,
        "GET",
        &format!("/orders/{order_id}/order_total"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(total["total_price"], 36.0);

    let (status, finalized) = send(
        &app,
        "POST",
        &format!("/orders/{order_id}/finalize_order"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(finalized["status"], "Preparing");
    assert_eq!(finalized["total_price"], 36.0);

    // The customer's own order list.
    let (status, mine) = send(
        &app,
        "GET",
        &format!("/users/{}/orders", claims.user_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 1);

    // Today's orders, as seen by staff.
    let today = chrono::Utc::now().date_naive();
    let (status, todays) = send(
        &app,
        "GET",
        &format!("/orders/by_date/{}", today.format("%Y/%-m/%-d")),
        Some(&employee),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(todays.as_array().unwrap().len(), 1);

    // The menu is now referenced and cannot go away.
    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/menus/{menu_id}"),
        Some(&employee),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_unknown_order_is_not_found() {
    let (app, config) = spawn_app();
    let admin = staff_token(&config, RoleType::Admin);

    let (status, body) = send(&app, "GET", "/orders/404", Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"detail": "Order not found"}));
}

#[tokio::test]
async fn test_malformed_bodies_answer_with_detail() {
    let (app, config) = spawn_app();
    let employee = staff_token(&config, RoleType::Employee);

    let cases = [
        // Broken JSON.
        (
            "/users/login",
            None,
            Some("application/json"),
            r#"{"email": "eve@example.com","#,
        ),
        // No content type.
        (
            "/users/login",
            None,
            None,
            r#"{"email": "eve@example.com", "password": "pw"}"#,
        ),
        // Well-formed but mistyped.
        (
            "/categories",
            Some(employee.as_str()),
            Some("application/json"),
            r#"{"name": 42}"#,
        ),
    ];

    for (uri, token, content_type, body) in cases {
        let mut builder = Request::builder().method("POST").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        let response = app
            .clone()
            .oneshot(builder.body(Body::from(body)).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}: {body}");
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(json["detail"].is_string(), "{uri}: {json}");
    }
}
