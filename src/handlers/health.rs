use axum::extract::State;
use tracing::warn;

use crate::{db, errors::ServiceError, ApiResponse, AppState};

/// Database ping wrapped in the envelope
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Database reachable", body = ApiResponse),
        (status = 500, description = "Database unreachable", body = ApiResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<AppState>) -> Result<ApiResponse, ServiceError> {
    db::check_connection(&state.db).await.map_err(|e| {
        warn!(error = %e, "Health check failed");
        e
    })?;
    Ok(ApiResponse::ok("healthy"))
}
