//! Session handlers: CRUD, public occupancy, and admission statistics.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use tickethub_entity::session::CreateEventSession;
use tickethub_service::session::service::UpdateSessionRequest;

use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// POST /api/events/{id}/sessions
pub async fn create_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(event_id): Path<Uuid>,
    Json(req): Json<CreateEventSession>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let session = state.session_service.create(&auth, event_id, req).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": session })))
}

/// GET /api/events/{id}/sessions (public)
///
/// Lists sessions with remaining capacity so applicants can pick one.
pub async fn list_event_sessions(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let sessions = state.session_service.list_for_event(event_id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": sessions })))
}

/// GET /api/events/{id}/sessions/stats
pub async fn event_session_stats(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(event_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let stats = state
        .session_service
        .stats_for_event(&auth, event_id)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": stats })))
}

/// GET /api/sessions/{id} (public)
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let session = state.session_service.get(id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": session })))
}

/// GET /api/sessions/{id}/capacity (public)
///
/// The capacity ledger view: configured capacity, issued headcount, and
/// the remaining count (negative when overbooked by a capacity edit).
pub async fn get_session_capacity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let capacity = state.session_service.remaining_capacity(id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": capacity })))
}

/// PUT /api/sessions/{id}
pub async fn update_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateSessionRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let session = state.session_service.update(&auth, id, req).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": session })))
}

/// DELETE /api/sessions/{id}
pub async fn delete_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.session_service.delete(&auth, id).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": { "message": "Session deleted" } }),
    ))
}

/// GET /api/sessions/{id}/tickets
pub async fn list_session_tickets(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let result = state
        .admission_service
        .list_session_tickets(&auth, id, params.into_page_request())
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": result })))
}
