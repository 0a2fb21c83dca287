use axum::{
    Json,
    extract::{Path, State},
};
use chrono::NaiveDate;

use crate::{
    AppState,
    auth::{ADMIN_ONLY, AuthUser, STAFF},
    error::AppError,
    handlers::{ApiJson, deleted},
    models::{
        CreateOrderRequest, DetailResponse, Order, OrderDetail, OrderTotal, RoleType,
        UpdateOrderRequest,
    },
    orders,
    repository::Repository,
};

/// Loads an order and checks that the caller owns it or is staff.
async fn owned_order(repo: &dyn Repository, auth_user: &AuthUser, id: i64) -> Result<Order, AppError> {
    let order = repo
        .get_order(id)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;
    auth_user.require_self_or_any(order.client_id, STAFF)?;
    Ok(order)
}

/// [Staff Route] Lists every order.
#[utoipa::path(
    get,
    path = "/orders",
    responses((status = 200, description = "Orders", body = [Order])),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn list_orders(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>, AppError> {
    auth_user.require_any(STAFF)?;
    Ok(Json(state.repo.list_orders().await?))
}

/// create_order
///
/// [Authenticated Route] Opens an order. Staff may open one for any client; a
/// customer only for themselves.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order created", body = Order),
        (status = 400, description = "Invalid payload or unknown client"),
        (status = 403, description = "Customers can only order for themselves")
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn create_order(
    auth_user: AuthUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateOrderRequest>,
) -> Result<Json<Order>, AppError> {
    auth_user.require_any(&[RoleType::Admin, RoleType::Employee, RoleType::Customer])?;
    auth_user.require_self_or_any(payload.client_id, STAFF)?;
    Ok(Json(orders::create_order(state.repo.as_ref(), payload).await?))
}

/// [Owner or Staff] Fetches one order.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order", body = Order),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn get_order(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(owned_order(state.repo.as_ref(), &auth_user, id).await?))
}

/// [Staff Route] Partial update. Any status may be assigned directly here.
#[utoipa::path(
    put,
    path = "/orders/{id}",
    params(("id" = i64, Path, description = "Order id")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = Order),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn update_order(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<UpdateOrderRequest>,
) -> Result<Json<Order>, AppError> {
    auth_user.require_any(STAFF)?;
    let order = orders::update_order(state.repo.as_ref(), id, payload)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;
    Ok(Json(order))
}

/// [Admin Route] Deletes an order without line items.
#[utoipa::path(
    delete,
    path = "/orders/{id}",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order deleted", body = DetailResponse),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order still has line items")
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn delete_order(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DetailResponse>, AppError> {
    auth_user.require_any(ADMIN_ONLY)?;
    if !orders::delete_order(state.repo.as_ref(), id).await? {
        return Err(AppError::not_found("Order"));
    }
    Ok(deleted("Order"))
}

/// get_orders_by_date
///
/// [Staff Route] Orders created on one UTC calendar day.
#[utoipa::path(
    get,
    path = "/orders/by_date/{year}/{month}/{day}",
    params(
        ("year" = i32, Path, description = "Year"),
        ("month" = u32, Path, description = "Month (1-12)"),
        ("day" = u32, Path, description = "Day of month")
    ),
    responses(
        (status = 200, description = "Orders of the day", body = [Order]),
        (status = 400, description = "Not a calendar date")
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn get_orders_by_date(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((year, month, day)): Path<(i32, u32, u32)>,
) -> Result<Json<Vec<Order>>, AppError> {
    auth_user.require_any(STAFF)?;
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        AppError::Validation(format!("{year}-{month}-{day} is not a valid date."))
    })?;
    Ok(Json(orders::get_orders_by_date(state.repo.as_ref(), date).await?))
}

/// [Owner or Staff] Line items of one order.
#[utoipa::path(
    get,
    path = "/orders/{id}/details",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Line items", body = [OrderDetail]),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn get_order_details(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<OrderDetail>>, AppError> {
    owned_order(state.repo.as_ref(), &auth_user, id).await?;
    Ok(Json(state.repo.list_details_for_order(id).await?))
}

/// get_order_total
///
/// [Owner or Staff] Live total over the non-cancelled line items. Does not touch
/// the stored `total_price`.
#[utoipa::path(
    get,
    path = "/orders/{id}/order_total",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Computed total", body = OrderTotal),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn get_order_total(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<OrderTotal>, AppError> {
    owned_order(state.repo.as_ref(), &auth_user, id).await?;
    let total_price = orders::get_order_total(state.repo.as_ref(), id).await?;
    Ok(Json(OrderTotal {
        order_id: id,
        total_price,
    }))
}

/// finalize_order
///
/// [Owner or Staff] Freezes the computed total and moves the order to
/// `Preparing`. Orders past `Created` are returned unchanged.
#[utoipa::path(
    post,
    path = "/orders/{id}/finalize_order",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Finalized (or unchanged) order", body = Order),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn finalize_order(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Order>, AppError> {
    owned_order(state.repo.as_ref(), &auth_user, id).await?;
    let order = orders::finalize_order(state.repo.as_ref(), id)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;
    Ok(Json(order))
}
