//! Menus and categories. Reads are public; writes need a staff role.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    AppState,
    auth::{AuthUser, STAFF},
    catalog,
    error::AppError,
    handlers::{ApiJson, deleted},
    models::{
        Category, CreateCategoryRequest, CreateMenuRequest, DetailResponse, Menu,
        UpdateCategoryRequest, UpdateMenuRequest,
    },
};

// --- Menus ---

/// [Public Route] Lists the whole menu.
#[utoipa::path(
    get,
    path = "/menus",
    responses((status = 200, description = "Menus", body = [Menu])),
    tag = "menus"
)]
pub async fn list_menus(State(state): State<AppState>) -> Result<Json<Vec<Menu>>, AppError> {
    Ok(Json(state.repo.list_menus().await?))
}

#[utoipa::path(
    get,
    path = "/menus/{id}",
    params(("id" = i64, Path, description = "Menu id")),
    responses(
        (status = 200, description = "Menu", body = Menu),
        (status = 404, description = "Menu not found")
    ),
    tag = "menus"
)]
pub async fn get_menu(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Menu>, AppError> {
    let menu = state
        .repo
        .get_menu(id)
        .await?
        .ok_or_else(|| AppError::not_found("Menu"))?;
    Ok(Json(menu))
}

/// create_menu
///
/// [Staff Route] Adds a menu. The name must be unique and a referenced category
/// must exist.
#[utoipa::path(
    post,
    path = "/menus",
    request_body = CreateMenuRequest,
    responses(
        (status = 200, description = "Menu created", body = Menu),
        (status = 400, description = "Invalid payload or name taken"),
        (status = 403, description = "Staff only")
    ),
    security(("bearer_auth" = [])),
    tag = "menus"
)]
pub async fn create_menu(
    auth_user: AuthUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateMenuRequest>,
) -> Result<Json<Menu>, AppError> {
    auth_user.require_any(STAFF)?;
    Ok(Json(catalog::create_menu(state.repo.as_ref(), payload).await?))
}

#[utoipa::path(
    put,
    path = "/menus/{id}",
    params(("id" = i64, Path, description = "Menu id")),
    request_body = UpdateMenuRequest,
    responses(
        (status = 200, description = "Menu updated", body = Menu),
        (status = 404, description = "Menu not found")
    ),
    security(("bearer_auth" = [])),
    tag = "menus"
)]
pub async fn update_menu(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<UpdateMenuRequest>,
) -> Result<Json<Menu>, AppError> {
    auth_user.require_any(STAFF)?;
    let menu = catalog::update_menu(state.repo.as_ref(), id, payload)
        .await?
        .ok_or_else(|| AppError::not_found("Menu"))?;
    Ok(Json(menu))
}

#[utoipa::path(
    delete,
    path = "/menus/{id}",
    params(("id" = i64, Path, description = "Menu id")),
    responses(
        (status = 200, description = "Menu deleted", body = DetailResponse),
        (status = 404, description = "Menu not found"),
        (status = 409, description = "Menu is referenced by order line items")
    ),
    security(("bearer_auth" = [])),
    tag = "menus"
)]
pub async fn delete_menu(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DetailResponse>, AppError> {
    auth_user.require_any(STAFF)?;
    if !catalog::delete_menu(state.repo.as_ref(), id).await? {
        return Err(AppError::not_found("Menu"));
    }
    Ok(deleted("Menu"))
}

// --- Categories ---

#[utoipa::path(
    get,
    path = "/categories",
    responses((status = 200, description = "Categories", body = [Category])),
    tag = "categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(state.repo.list_categories().await?))
}

#[utoipa::path(
    get,
    path = "/categories/{id}",
    params(("id" = i64, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category", body = Category),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Category>, AppError> {
    let category = state
        .repo
        .get_category(id)
        .await?
        .ok_or_else(|| AppError::not_found("Category"))?;
    Ok(Json(category))
}

#[utoipa::path(
    post,
    path = "/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 200, description = "Category created", body = Category),
        (status = 400, description = "Invalid payload or name taken"),
        (status = 403, description = "Staff only")
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn create_category(
    auth_user: AuthUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateCategoryRequest>,
) -> Result<Json<Category>, AppError> {
    auth_user.require_any(STAFF)?;
    Ok(Json(catalog::create_category(state.repo.as_ref(), payload).await?))
}

#[utoipa::path(
    put,
    path = "/categories/{id}",
    params(("id" = i64, Path, description = "Category id")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 404, description = "Category not found")
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn update_category(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<UpdateCategoryRequest>,
) -> Result<Json<Category>, AppError> {
    auth_user.require_any(STAFF)?;
    let category = catalog::update_category(state.repo.as_ref(), id, payload)
        .await?
        .ok_or_else(|| AppError::not_found("Category"))?;
    Ok(Json(category))
}

/// [Staff Route] Deletes an empty category.
#[utoipa::path(
    delete,
    path = "/categories/{id}",
    params(("id" = i64, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category deleted", body = DetailResponse),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Category still holds menus")
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn delete_category(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DetailResponse>, AppError> {
    auth_user.require_any(STAFF)?;
    if !catalog::delete_category(state.repo.as_ref(), id).await? {
        return Err(AppError::not_found("Category"));
    }
    Ok(deleted("Category"))
}
