use crate::{
    AppState,
    handlers::{catalog, order_details, orders, users},
};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Authenticated Router Module
///
/// Every route here sits behind `auth_middleware`, so a request without a valid
/// bearer token never reaches a handler. Handlers then apply their own role
/// allow-list and owner checks through the `AuthUser` extractor.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // --- Users ---
        // GET lists (staff), POST creates with explicit roles (admin).
        .route("/users", get(users::list_users).post(users::create_user))
        // Self or staff for reads and profile edits; delete is admin only.
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/users/{id}/orders", get(users::get_user_orders))
        // --- Catalog writes (staff) ---
        // Reads on these paths come from the public router.
        .route("/menus", post(catalog::create_menu))
        .route(
            "/menus/{id}",
            put(catalog::update_menu).delete(catalog::delete_menu),
        )
        .route("/categories", post(catalog::create_category))
        .route(
            "/categories/{id}",
            put(catalog::update_category).delete(catalog::delete_category),
        )
        // --- Orders ---
        .route("/orders", get(orders::list_orders).post(orders::create_order))
        .route(
            "/orders/{id}",
            get(orders::get_order)
                .put(orders::update_order)
                .delete(orders::delete_order),
        )
        // GET /orders/by_date/{year}/{month}/{day}
        // Orders created on one UTC calendar day.
        .route(
            "/orders/by_date/{year}/{month}/{day}",
            get(orders::get_orders_by_date),
        )
        .route("/orders/{id}/details", get(orders::get_order_details))
        // Live total; never written back.
        .route("/orders/{id}/order_total", get(orders::get_order_total))
        // Created -> Preparing with the total frozen. No-op on any other status.
        .route("/orders/{id}/finalize_order", post(orders::finalize_order))
        // --- Order details ---
        .route(
            "/orderdetails",
            get(order_details::list_order_details).post(order_details::create_order_detail),
        )
        .route(
            "/orderdetails/{id}",
            get(order_details::get_order_detail)
                .put(order_details::update_order_detail)
                .delete(order_details::delete_order_detail),
        )
}
