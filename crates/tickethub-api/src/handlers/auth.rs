//! Staff authentication handlers.

use axum::Json;
use axum::extract::State;

use tickethub_service::account::service::{LoginRequest, RegisterRequest};

use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let authed = state.account_service.register(req).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": authed })))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let authed = state.account_service.login(req).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": authed })))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = state.account_service.me(&auth).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": user })))
}
