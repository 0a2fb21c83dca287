use crate::{AppState, handlers::roles};
use axum::{Router, routing::get};

/// Admin Router Module
///
/// Role management. `create_router` wraps this router in `admin_middleware`,
/// which authenticates the caller and requires the admin role before any
/// handler runs.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET lists every role, POST creates one (role types are unique).
        .route("/roles", get(roles::list_roles).post(roles::create_role))
        // PUT is refused while users hold the role; DELETE likewise.
        .route(
            "/roles/{id}",
            get(roles::get_role)
                .put(roles::update_role)
                .delete(roles::delete_role),
        )
}
