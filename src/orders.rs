//! Orders, their line items and the totals engine.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, SubsecRound, TimeDelta, Utc};

use crate::{
    error::AppError,
    models::{
        CreateOrderDetailRequest, CreateOrderRequest, NewOrder, NewOrderDetail, Order,
        OrderDetail, OrderDetailStatus, OrderStatus, UpdateOrderDetailRequest,
        UpdateOrderRequest,
    },
    repository::Repository,
};

// --- Totals Engine ---

/// Sum of `price * quantity` over the line items that are not cancelled.
/// Plain `f64` arithmetic, no rounding.
pub fn order_total(details: &[OrderDetail]) -> f64 {
    details
        .iter()
        .filter(|detail| detail.status != OrderDetailStatus::Cancelled)
        .map(OrderDetail::line_total)
        .sum()
}

/// get_order_total
///
/// Live total of an order, computed from its current line items. An order without
/// qualifying items totals 0.0.
pub async fn get_order_total(repo: &dyn Repository, order_id: i64) -> Result<f64, AppError> {
    let details = repo.list_details_for_order(order_id).await?;
    Ok(order_total(&details))
}

/// finalize_order
///
/// The only server-driven transition: `Created -> Preparing`. The total is
/// recomputed from the live line items and frozen on the order. Any other status
/// leaves the order untouched, so a second call is a no-op.
///
/// Returns `None` when the order does not exist.
pub async fn finalize_order(repo: &dyn Repository, order_id: i64) -> Result<Option<Order>, AppError> {
    let Some(mut order) = repo.get_order(order_id).await? else {
        return Ok(None);
    };

    if order.status != OrderStatus::Created {
        tracing::debug!(order_id, status = ?order.status, "finalize skipped");
        return Ok(Some(order));
    }

    order.total_price = get_order_total(repo, order_id).await?;
    order.status = OrderStatus::Preparing;

    let updated = repo.update_order(&order).await?;
    if let Some(order) = &updated {
        tracing::info!(order_id, total_price = order.total_price, "order finalized");
    }
    Ok(updated)
}

/// The inclusive UTC window `[date 00:00:00.000000, date 23:59:59.999999]`.
pub fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    let end = start
        .checked_add_days(Days::new(1))
        .map(|next| next - TimeDelta::microseconds(1))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    (start, end)
}

pub async fn get_orders_by_date(repo: &dyn Repository, date: NaiveDate) -> Result<Vec<Order>, AppError> {
    let (start, end) = day_bounds(date);
    Ok(repo.list_orders_between(start, end).await?)
}

pub async fn get_orders_for_user(repo: &dyn Repository, user_id: i64) -> Result<Vec<Order>, AppError> {
    Ok(repo.list_orders_for_client(user_id).await?)
}

// --- Order CRUD ---

async fn ensure_client_exists(repo: &dyn Repository, client_id: i64) -> Result<(), AppError> {
    if repo.get_user(client_id).await?.is_none() {
        return Err(AppError::Validation(format!("User {client_id} does not exist.")));
    }
    Ok(())
}

/// create_order
///
/// The client must exist. `created_at` is stamped here, in UTC at microsecond
/// precision so it always falls inside one `day_bounds` window.
pub async fn create_order(repo: &dyn Repository, req: CreateOrderRequest) -> Result<Order, AppError> {
    req.validate()?;
    ensure_client_exists(repo, req.client_id).await?;

    let order = repo
        .create_order(NewOrder {
            client_id: req.client_id,
            total_price: req.total_price,
            status: req.status,
            created_at: Utc::now().trunc_subsecs(6),
        })
        .await?;

    tracing::info!(order_id = order.id, client_id = order.client_id, "order created");
    Ok(order)
}

pub async fn update_order(
    repo: &dyn Repository,
    id: i64,
    req: UpdateOrderRequest,
) -> Result<Option<Order>, AppError> {
    req.validate()?;

    let Some(mut order) = repo.get_order(id).await? else {
        return Ok(None);
    };
    if let Some(client_id) = req.client_id {
        if client_id != order.client_id {
            ensure_client_exists(repo, client_id).await?;
        }
    }

    req.apply(&mut order);
    Ok(repo.update_order(&order).await?)
}

/// Restricted while the order still has line items.
pub async fn delete_order(repo: &dyn Repository, id: i64) -> Result<bool, AppError> {
    if repo.get_order(id).await?.is_none() {
        return Ok(false);
    }
    if !repo.list_details_for_order(id).await?.is_empty() {
        return Err(AppError::Conflict(
            "The order still has line items and cannot be deleted.".to_string(),
        ));
    }
    Ok(repo.delete_order(id).await?)
}

// --- Order Detail CRUD ---

async fn ensure_order_exists(repo: &dyn Repository, order_id: i64) -> Result<Order, AppError> {
    repo.get_order(order_id)
        .await?
        .ok_or_else(|| AppError::Validation(format!("Order {order_id} does not exist.")))
}

/// create_order_detail
///
/// Both the parent order and the menu must exist. Without an explicit price the
/// line item captures the menu's current price.
pub async fn create_order_detail(
    repo: &dyn Repository,
    req: CreateOrderDetailRequest,
) -> Result<OrderDetail, AppError> {
    req.validate()?;
    ensure_order_exists(repo, req.order_id).await?;

    let menu = repo
        .get_menu(req.menu_id)
        .await?
        .ok_or_else(|| AppError::Validation(format!("Menu {} does not exist.", req.menu_id)))?;

    let detail = repo
        .create_order_detail(NewOrderDetail {
            order_id: Some(req.order_id),
            menu_id: menu.id,
            price: req.price.unwrap_or(menu.price),
            comment: req.comment,
            quantity: req.quantity,
            status: req.status,
        })
        .await?;

    tracing::debug!(detail_id = detail.id, order_id = req.order_id, "order detail created");
    Ok(detail)
}

pub async fn update_order_detail(
    repo: &dyn Repository,
    id: i64,
    req: UpdateOrderDetailRequest,
) -> Result<Option<OrderDetail>, AppError> {
    req.validate()?;

    let Some(mut detail) = repo.get_order_detail(id).await? else {
        return Ok(None);
    };
    if let Some(order_id) = req.order_id {
        ensure_order_exists(repo, order_id).await?;
    }
    if let Some(menu_id) = req.menu_id {
        if repo.get_menu(menu_id).await?.is_none() {
            return Err(AppError::Validation(format!("Menu {menu_id} does not exist.")));
        }
    }

    req.apply(&mut detail);
    Ok(repo.update_order_detail(&detail).await?)
}

pub async fn delete_order_detail(repo: &dyn Repository, id: i64) -> Result<bool, AppError> {
    Ok(repo.delete_order_detail(id).await?)
}
