//! HTTP handlers, one module per resource.
//!
//! Handlers stay thin: they run the role gate for their operation, delegate to the
//! service modules and map an absent entity to 404.

pub mod catalog;
pub mod order_details;
pub mod orders;
pub mod roles;
pub mod users;

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};

use crate::{error::AppError, models::DetailResponse};

/// ApiJson
///
/// `axum::Json` whose rejection (bad content type, malformed or mistyped body)
/// is reported as `AppError::Validation`, so clients get a `{"detail"}` body
/// like every other error.
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

/// GET /health
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = String))
)]
pub async fn health() -> &'static str {
    "ok"
}

pub(crate) fn deleted(entity: &str) -> Json<DetailResponse> {
    Json(DetailResponse::new(format!("{entity} deleted successfully")))
}
