//! Event handlers: organization-side CRUD and the public listing.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use tickethub_core::types::pagination::PageRequest;
use tickethub_service::event::service::{CreateEventRequest, EventSearch, UpdateEventRequest};

use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// Query parameters for the public event listing.
///
/// Pagination fields are inlined because `serde_urlencoded` cannot
/// deserialize flattened numeric fields.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct EventSearchParams {
    /// Substring match over name and description.
    pub query: Option<String>,
    /// Exact tag match.
    pub tag: Option<String>,
    /// Page number (1-based, default: 1).
    #[serde(default = "default_page")]
    pub page: u64,
    /// Items per page (default: 10, max: 100).
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    10
}

/// GET /api/events (public)
pub async fn search_events(
    State(state): State<AppState>,
    Query(params): Query<EventSearchParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let result = state
        .event_service
        .search(
            EventSearch {
                query: params.query,
                tag: params.tag,
            },
            PageRequest::new(params.page, params.per_page),
        )
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": result })))
}

/// GET /api/events/{id} (public)
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let event = state.event_service.get(id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": event })))
}

/// POST /api/organizations/{id}/events
pub async fn create_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(organization_id): Path<Uuid>,
    Json(req): Json<CreateEventRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let event = state
        .event_service
        .create(&auth, organization_id, req)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": event })))
}

/// GET /api/organizations/{id}/events
pub async fn list_organization_events(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(organization_id): Path<Uuid>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let result = state
        .event_service
        .list_for_organization(&auth, organization_id, params.into_page_request())
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": result })))
}

/// PUT /api/events/{id}
pub async fn update_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let event = state.event_service.update(&auth, id, req).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": event })))
}

/// DELETE /api/events/{id}
pub async fn delete_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.event_service.delete(&auth, id).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": { "message": "Event deleted" } }),
    ))
}
