//! Health check handlers.

use axum::Json;
use axum::extract::State;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api/health/detailed
///
/// Includes a database round-trip.
pub async fn health_detailed(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let database = match sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.db_pool)
        .await
    {
        Ok(1) => "connected",
        _ => "unavailable",
    };

    Ok(Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "database": database,
    })))
}
