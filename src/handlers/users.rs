use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    AppState, accounts,
    auth::{self, ADMIN_ONLY, AuthUser, STAFF},
    error::AppError,
    handlers::{ApiJson, deleted},
    models::{
        CreateUserRequest, DetailResponse, LoginRequest, Order, SignupRequest, TokenResponse,
        UpdateUserRequest, UserPublic,
    },
    orders,
};

/// signup
///
/// [Public Route] Registers a customer account and returns a signed access token.
/// A `role_ids` field in the payload is accepted but ignored.
#[utoipa::path(
    post,
    path = "/users/signup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Signed up", body = TokenResponse),
        (status = 400, description = "Invalid payload or email taken")
    ),
    tag = "users"
)]
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SignupRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let user = accounts::signup(state.repo.as_ref(), payload).await?;
    let token = auth::issue_token(&state.config, user.id, &user.role_types())?;
    Ok(Json(token))
}

/// login
///
/// [Public Route] Exchanges email and password for an access token.
#[utoipa::path(
    post,
    path = "/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = TokenResponse),
        (status = 401, description = "Incorrect email or password")
    ),
    tag = "users"
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let token = accounts::login(state.repo.as_ref(), &state.config, payload).await?;
    Ok(Json(token))
}

/// [Staff Route] Lists every user.
#[utoipa::path(
    get,
    path = "/users",
    responses((status = 200, description = "Users", body = [UserPublic])),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn list_users(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserPublic>>, AppError> {
    auth_user.require_any(STAFF)?;
    let users = state.repo.list_users().await?;
    Ok(Json(users.into_iter().map(UserPublic::from).collect()))
}

/// create_user
///
/// [Admin Route] Creates a user with an explicit role selection. Every role id
/// must exist or nothing is created.
#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User created", body = UserPublic),
        (status = 400, description = "Invalid payload, unknown role id or email taken"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn create_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateUserRequest>,
) -> Result<Json<UserPublic>, AppError> {
    auth_user.require_any(ADMIN_ONLY)?;
    let user = accounts::create_user(state.repo.as_ref(), payload).await?;
    Ok(Json(user.into()))
}

/// [Self or Staff] Fetches one user.
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserPublic),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserPublic>, AppError> {
    auth_user.require_self_or_any(id, STAFF)?;
    let user = state
        .repo
        .get_user(id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    Ok(Json(user.into()))
}

/// update_user
///
/// [Self or Staff] Partial profile update. Replacing the role set is reserved
/// to administrators, even on one's own account. Only the account owner or an
/// administrator may change its email or password.
#[utoipa::path(
    put,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserPublic),
        (status = 403, description = "Not allowed"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn update_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<UpdateUserRequest>,
) -> Result<Json<UserPublic>, AppError> {
    auth_user.require_self_or_any(id, STAFF)?;
    if payload.role_ids.is_some() {
        auth_user.require_any(ADMIN_ONLY)?;
    }
    // Staff may edit another user's profile, but not their sign-in credentials.
    let changes_credentials = payload.email.is_some() || payload.password.is_some();
    if changes_credentials && auth_user.id != id {
        auth_user.require_any(ADMIN_ONLY)?;
    }

    let user = accounts::update_user(state.repo.as_ref(), id, payload)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    Ok(Json(user.into()))
}

/// [Admin Route] Deletes a user who has no orders.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = DetailResponse),
        (status = 404, description = "User not found"),
        (status = 409, description = "User still has orders")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn delete_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DetailResponse>, AppError> {
    auth_user.require_any(ADMIN_ONLY)?;
    if !accounts::delete_user(state.repo.as_ref(), id).await? {
        return Err(AppError::not_found("User"));
    }
    Ok(deleted("User"))
}

/// [Self or Staff] Lists the orders placed by one user.
#[utoipa::path(
    get,
    path = "/users/{id}/orders",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Orders of the user", body = [Order]),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_user_orders(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Order>>, AppError> {
    auth_user.require_self_or_any(id, STAFF)?;
    if state.repo.get_user(id).await?.is_none() {
        return Err(AppError::not_found("User"));
    }
    let orders = orders::get_orders_for_user(state.repo.as_ref(), id).await?;
    Ok(Json(orders))
}
