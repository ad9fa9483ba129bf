// Handlers module
// HTTP handlers for the REST API

pub mod auth;
pub mod comments;
pub mod posts;
pub mod profiles;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

use crate::{db::Database, error::ApiError};

/// Health check handler
/// Returns "OK" with 200 status for liveness checks
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Process is up", body = String))
)]
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Readiness check handler
/// Round-trips to PostgreSQL; 500 when the database is unreachable
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "Database reachable", body = String),
        (status = 500, description = "Database unavailable")
    )
)]
pub async fn readiness_check(
    State(db): State<Arc<Database>>,
) -> Result<impl IntoResponse, ApiError> {
    db.health_check().await?;
    Ok((StatusCode::OK, "READY"))
}
