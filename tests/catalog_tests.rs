use axum::http::StatusCode;
use restaurant_orders::{
    InMemoryRepository, Repository, catalog,
    models::{
        CreateCategoryRequest, CreateMenuRequest, NewOrder, NewOrderDetail, NewUser,
        OrderDetailStatus, OrderStatus, UpdateCategoryRequest, UpdateMenuRequest,
    },
};

fn menu_request(name: &str, category_id: Option<i64>) -> CreateMenuRequest {
    CreateMenuRequest {
        name: name.to_string(),
        price: 7.5,
        category_id,
        description: "House special".to_string(),
        stock: 3,
    }
}

#[tokio::test]
async fn test_category_create_and_fetch() {
    let repo = InMemoryRepository::new();

    let created = catalog::create_category(
        &repo,
        CreateCategoryRequest {
            name: "desserts".to_string(),
        },
    )
    .await
    .unwrap();

    let fetched = repo.get_category(created.id).await.unwrap().unwrap();
    assert_eq!(fetched.name, "desserts");
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_category_names_are_unique() {
    let repo = InMemoryRepository::new();
    let request = CreateCategoryRequest {
        name: "mains".to_string(),
    };
    catalog::create_category(&repo, request.clone()).await.unwrap();

    let err = catalog::create_category(&repo, request).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_category_rename_keeps_own_name_available() {
    let repo = InMemoryRepository::new();
    let starters = catalog::create_category(
        &repo,
        CreateCategoryRequest {
            name: "starters".to_string(),
        },
    )
    .await
    .unwrap();
    catalog::create_category(
        &repo,
        CreateCategoryRequest {
            name: "sides".to_string(),
        },
    )
    .await
    .unwrap();

    let same = catalog::update_category(
        &repo,
        starters.id,
        UpdateCategoryRequest {
            name: Some("starters".to_string()),
        },
    )
    .await
    .unwrap();
    assert!(same.is_some());

    let clash = catalog::update_category(
        &repo,
        starters.id,
        UpdateCategoryRequest {
            name: Some("sides".to_string()),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(clash.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_category_with_menus_cannot_be_deleted() {
    let repo = InMemoryRepository::new();
    let category = catalog::create_category(
        &repo,
        CreateCategoryRequest {
            name: "drinks".to_string(),
        },
    )
    .await
    .unwrap();
    catalog::create_menu(&repo, menu_request("Lemonade", Some(category.id)))
        .await
        .unwrap();

    let err = catalog::delete_category(&repo, category.id).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::CONFLICT);
    assert!(!catalog::delete_category(&repo, 999).await.unwrap());
}

#[tokio::test]
async fn test_menu_requires_unique_name_and_existing_category() {
    let repo = InMemoryRepository::new();

    let dangling = catalog::create_menu(&repo, menu_request("Pasta", Some(42)))
        .await
        .unwrap_err();
    assert_eq!(dangling.status(), StatusCode::BAD_REQUEST);

    catalog::create_menu(&repo, menu_request("Pasta", None)).await.unwrap();
    let duplicate = catalog::create_menu(&repo, menu_request("Pasta", None))
        .await
        .unwrap_err();
    assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_menu_update_patches_only_supplied_fields() {
    let repo = InMemoryRepository::new();
    let menu = catalog::create_menu(&repo, menu_request("Risotto", None))
        .await
        .unwrap();

    let updated = catalog::update_menu(
        &repo,
        menu.id,
        UpdateMenuRequest {
            price: Some(9.0),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.price, 9.0);
    assert_eq!(updated.name, "Risotto");
    assert_eq!(updated.stock, 3);

    let negative = catalog::update_menu(
        &repo,
        menu.id,
        UpdateMenuRequest {
            stock: Some(-1),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert_eq!(negative.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_menu_referenced_by_order_detail_cannot_be_deleted() {
    let repo = InMemoryRepository::with_default_roles();
    let menu = catalog::create_menu(&repo, menu_request("Tiramisu", None))
        .await
        .unwrap();
    let client = repo
        .create_user(
            NewUser {
                username: "c".to_string(),
                email: "c@example.com".to_string(),
                password_hash: "unused".to_string(),
                first_name: String::new(),
                last_name: String::new(),
                address: String::new(),
                phone: String::new(),
            },
            &[3],
        )
        .await
        .unwrap();
    let order = repo
        .create_order(NewOrder {
            client_id: client.id,
            total_price: 7.5,
            status: OrderStatus::Created,
            created_at: chrono::Utc::now(),
        })
        .await
        .unwrap();
    repo.create_order_detail(NewOrderDetail {
        order_id: Some(order.id),
        menu_id: menu.id,
        price: 7.5,
        comment: String::new(),
        quantity: 1,
        status: OrderDetailStatus::Created,
    })
    .await
    .unwrap();

    let err = catalog::delete_menu(&repo, menu.id).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::CONFLICT);
}
