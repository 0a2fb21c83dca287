use crate::{
    AppState,
    handlers::{self, catalog, users},
};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a token. Catalog writes on the same paths are
/// registered by the authenticated router and merged in `create_router`.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(handlers::health))
        // POST /users/signup
        // Self-registration; always yields a customer and returns a token.
        .route("/users/signup", post(users::signup))
        // POST /users/login
        .route("/users/login", post(users::login))
        // GET /menus, /menus/{id}
        .route("/menus", get(catalog::list_menus))
        .route("/menus/{id}", get(catalog::get_menu))
        // GET /categories, /categories/{id}
        .route("/categories", get(catalog::list_categories))
        .route("/categories/{id}", get(catalog::get_category))
}
