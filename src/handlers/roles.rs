//! Role management. The whole router is wrapped by the admin gate, so these
//! handlers carry no role checks of their own.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    AppState, accounts,
    error::AppError,
    handlers::{ApiJson, deleted},
    models::{DetailResponse, Role, RoleRequest},
};

#[utoipa::path(
    get,
    path = "/roles",
    responses((status = 200, description = "Roles", body = [Role])),
    security(("bearer_auth" = [])),
    tag = "roles"
)]
pub async fn list_roles(State(state): State<AppState>) -> Result<Json<Vec<Role>>, AppError> {
    Ok(Json(state.repo.list_roles().await?))
}

#[utoipa::path(
    post,
    path = "/roles",
    request_body = RoleRequest,
    responses(
        (status = 200, description = "Role created", body = Role),
        (status = 400, description = "Role type already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "roles"
)]
pub async fn create_role(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RoleRequest>,
) -> Result<Json<Role>, AppError> {
    let role = accounts::create_role(state.repo.as_ref(), payload.role_type).await?;
    Ok(Json(role))
}

#[utoipa::path(
    get,
    path = "/roles/{id}",
    params(("id" = i64, Path, description = "Role id")),
    responses(
        (status = 200, description = "Role", body = Role),
        (status = 404, description = "Role not found")
    ),
    security(("bearer_auth" = [])),
    tag = "roles"
)]
pub async fn get_role(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Role>, AppError> {
    let role = state
        .repo
        .get_role(id)
        .await?
        .ok_or_else(|| AppError::not_found("Role"))?;
    Ok(Json(role))
}

/// update_role
///
/// Changes a role's type. Rejected while any user holds the role.
#[utoipa::path(
    put,
    path = "/roles/{id}",
    params(("id" = i64, Path, description = "Role id")),
    request_body = RoleRequest,
    responses(
        (status = 200, description = "Role updated", body = Role),
        (status = 400, description = "Role type already exists"),
        (status = 404, description = "Role not found"),
        (status = 409, description = "Role is held by users")
    ),
    security(("bearer_auth" = [])),
    tag = "roles"
)]
pub async fn update_role(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<RoleRequest>,
) -> Result<Json<Role>, AppError> {
    let role = accounts::update_role(state.repo.as_ref(), id, payload.role_type)
        .await?
        .ok_or_else(|| AppError::not_found("Role"))?;
    Ok(Json(role))
}

#[utoipa::path(
    delete,
    path = "/roles/{id}",
    params(("id" = i64, Path, description = "Role id")),
    responses(
        (status = 200, description = "Role deleted", body = DetailResponse),
        (status = 404, description = "Role not found"),
        (status = 409, description = "Role is held by users")
    ),
    security(("bearer_auth" = [])),
    tag = "roles"
)]
pub async fn delete_role(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DetailResponse>, AppError> {
    if !accounts::delete_role(state.repo.as_ref(), id).await? {
        return Err(AppError::not_found("Role"));
    }
    Ok(deleted("Role"))
}
