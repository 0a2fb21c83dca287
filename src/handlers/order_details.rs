use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    AppState,
    auth::{AuthUser, STAFF},
    error::AppError,
    handlers::{ApiJson, deleted},
    models::{CreateOrderDetailRequest, DetailResponse, OrderDetail, UpdateOrderDetailRequest},
    orders,
    repository::Repository,
};

/// Owner-or-staff gate for a line item attached to `order_id`. When the order is
/// unknown only staff pass; the service then rejects the dangling reference.
async fn require_order_access(
    repo: &dyn Repository,
    auth_user: &AuthUser,
    order_id: Option<i64>,
) -> Result<(), AppError> {
    let owner = match order_id {
        Some(order_id) => repo.get_order(order_id).await?.map(|order| order.client_id),
        None => None,
    };
    match owner {
        Some(client_id) => auth_user.require_self_or_any(client_id, STAFF),
        None => auth_user.require_any(STAFF),
    }
}

/// [Staff Route] Lists every line item.
#[utoipa::path(
    get,
    path = "/orderdetails",
    responses((status = 200, description = "Line items", body = [OrderDetail])),
    security(("bearer_auth" = [])),
    tag = "orderdetails"
)]
pub async fn list_order_details(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderDetail>>, AppError> {
    auth_user.require_any(STAFF)?;
    Ok(Json(state.repo.list_order_details().await?))
}

/// create_order_detail
///
/// [Owner or Staff] Adds a line item to an order. Without an explicit price the
/// menu's current price is captured.
#[utoipa::path(
    post,
    path = "/orderdetails",
    request_body = CreateOrderDetailRequest,
    responses(
        (status = 200, description = "Line item created", body = OrderDetail),
        (status = 400, description = "Invalid payload, unknown order or menu"),
        (status = 403, description = "Not the owner of the order")
    ),
    security(("bearer_auth" = [])),
    tag = "orderdetails"
)]
pub async fn create_order_detail(
    auth_user: AuthUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateOrderDetailRequest>,
) -> Result<Json<OrderDetail>, AppError> {
    require_order_access(state.repo.as_ref(), &auth_user, Some(payload.order_id)).await?;
    Ok(Json(orders::create_order_detail(state.repo.as_ref(), payload).await?))
}

#[utoipa::path(
    get,
    path = "/orderdetails/{id}",
    params(("id" = i64, Path, description = "Order detail id")),
    responses(
        (status = 200, description = "Line item", body = OrderDetail),
        (status = 404, description = "Order Detail not found")
    ),
    security(("bearer_auth" = [])),
    tag = "orderdetails"
)]
pub async fn get_order_detail(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<OrderDetail>, AppError> {
    let detail = state
        .repo
        .get_order_detail(id)
        .await?
        .ok_or_else(|| AppError::not_found("Order Detail"))?;
    require_order_access(state.repo.as_ref(), &auth_user, detail.order_id).await?;
    Ok(Json(detail))
}

/// update_order_detail
///
/// [Owner or Staff] Partial update. Moving the item to another order requires
/// access to that order too.
#[utoipa::path(
    put,
    path = "/orderdetails/{id}",
    params(("id" = i64, Path, description = "Order detail id")),
    request_body = UpdateOrderDetailRequest,
    responses(
        (status = 200, description = "Line item updated", body = OrderDetail),
        (status = 404, description = "Order Detail not found")
    ),
    security(("bearer_auth" = [])),
    tag = "orderdetails"
)]
pub async fn update_order_detail(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<UpdateOrderDetailRequest>,
) -> Result<Json<OrderDetail>, AppError> {
    let repo = state.repo.as_ref();
    let current = repo
        .get_order_detail(id)
        .await?
        .ok_or_else(|| AppError::not_found("Order Detail"))?;
    require_order_access(repo, &auth_user, current.order_id).await?;
    if payload.order_id.is_some() && payload.order_id != current.order_id {
        require_order_access(repo, &auth_user, payload.order_id).await?;
    }

    let detail = orders::update_order_detail(repo, id, payload)
        .await?
        .ok_or_else(|| AppError::not_found("Order Detail"))?;
    Ok(Json(detail))
}

#[utoipa::path(
    delete,
    path = "/orderdetails/{id}",
    params(("id" = i64, Path, description = "Order detail id")),
    responses(
        (status = 200, description = "Line item deleted", body = DetailResponse),
        (status = 404, description = "Order Detail not found")
    ),
    security(("bearer_auth" = [])),
    tag = "orderdetails"
)]
pub async fn delete_order_detail(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DetailResponse>, AppError> {
    auth_user.require_any(STAFF)?;
    if !orders::delete_order_detail(state.repo.as_ref(), id).await? {
        return Err(AppError::not_found("Order Detail"));
    }
    Ok(deleted("Order Detail"))
}
