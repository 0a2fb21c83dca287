use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Domain services.
pub mod accounts;
pub mod catalog;
pub mod orders;

// Cross-cutting components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod repository;

// Routing segregation (Public, Authenticated, Admin).
pub mod routes;
use auth::{ADMIN_ONLY, AuthUser};
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::AppError;
pub use memory::InMemoryRepository;
pub use repository::{PostgresRepository, Repository, RepositoryState};

/// ApiDoc
///
/// OpenAPI document aggregated from every `#[utoipa::path]` handler and
/// `ToSchema` model. Served at `/api-docs/openapi.json` and rendered at
/// `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::users::signup, handlers::users::login, handlers::users::list_users,
        handlers::users::create_user, handlers::users::get_user, handlers::users::update_user,
        handlers::users::delete_user, handlers::users::get_user_orders,
        handlers::roles::list_roles, handlers::roles::create_role, handlers::roles::get_role,
        handlers::roles::update_role, handlers::roles::delete_role,
        handlers::catalog::list_menus, handlers::catalog::get_menu, handlers::catalog::create_menu,
        handlers::catalog::update_menu, handlers::catalog::delete_menu,
        handlers::catalog::list_categories, handlers::catalog::get_category,
        handlers::catalog::create_category, handlers::catalog::update_category,
        handlers::catalog::delete_category,
        handlers::orders::list_orders, handlers::orders::create_order, handlers::orders::get_order,
        handlers::orders::update_order, handlers::orders::delete_order,
        handlers::orders::get_orders_by_date, handlers::orders::get_order_details,
        handlers::orders::get_order_total, handlers::orders::finalize_order,
        handlers::order_details::list_order_details, handlers::order_details::create_order_detail,
        handlers::order_details::get_order_detail, handlers::order_details::update_order_detail,
        handlers::order_details::delete_order_detail,
    ),
    components(
        schemas(
            models::RoleType, models::OrderStatus, models::OrderDetailStatus,
            models::Role, models::UserPublic, models::Category, models::Menu, models::Order,
            models::OrderDetail, models::SignupRequest, models::LoginRequest,
            models::TokenResponse, models::CreateUserRequest, models::UpdateUserRequest,
            models::RoleRequest, models::CreateCategoryRequest, models::UpdateCategoryRequest,
            models::CreateMenuRequest, models::UpdateMenuRequest, models::CreateOrderRequest,
            models::UpdateOrderRequest, models::CreateOrderDetailRequest,
            models::UpdateOrderDetailRequest, models::OrderTotal, models::DetailResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "users", description = "Accounts, signup and login"),
        (name = "roles", description = "Role management (admin)"),
        (name = "menus", description = "Menu catalog"),
        (name = "categories", description = "Menu categories"),
        (name = "orders", description = "Orders, totals and finalization"),
        (name = "orderdetails", description = "Order line items")
    )
)]
struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by the protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// AppState
///
/// The single state container shared by every request: the repository behind
/// its trait object and the immutable configuration.
#[derive(Clone)]
pub struct AppState {
    /// Postgres or in-memory, chosen at startup.
    pub repo: RepositoryState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Gate for `authenticated_routes`. Extracting `AuthUser` validates the bearer
/// token; on failure the extractor rejects with 401 before the handler runs.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// admin_middleware
///
/// Gate for `admin_routes`: authentication (401) followed by the admin role
/// check (403).
async fn admin_middleware(
    auth_user: AuthUser,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    auth_user.require_any(ADMIN_ONLY)?;
    Ok(next.run(request).await)
}

/// create_router
///
/// Assembles the routing tiers, applies scoped and global middleware and
/// registers the state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        // Method routers on shared paths (e.g. GET and POST /menus) are merged,
        // each method keeping its own layers.
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .merge(admin::admin_routes().route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin_middleware,
        )))
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the per-request span carrying method, URI and the `x-request-id`
/// so every log line of a request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
