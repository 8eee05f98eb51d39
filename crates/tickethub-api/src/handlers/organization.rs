//! Organization and membership handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;
use validator::Validate;

use tickethub_core::error::AppError;
use tickethub_entity::organization::MemberRole;
use tickethub_service::organization::service::{
    CreateOrganizationRequest, UpdateOrganizationRequest,
};

use crate::dto::request::AddMemberDto;
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// POST /api/organizations
pub async fn create_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateOrganizationRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let org = state.organization_service.create(&auth, req).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": org })))
}

/// GET /api/organizations
pub async fn list_organizations(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let result = state
        .organization_service
        .list_mine(&auth, params.into_page_request())
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": result })))
}

/// GET /api/organizations/{id}
pub async fn get_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let org = state.organization_service.get(&auth, id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": org })))
}

/// PUT /api/organizations/{id}
pub async fn update_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateOrganizationRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let org = state.organization_service.update(&auth, id, req).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": org })))
}

/// DELETE /api/organizations/{id}
pub async fn delete_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.organization_service.delete(&auth, id).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": { "message": "Organization deleted" } }),
    ))
}

/// GET /api/organizations/{id}/members
pub async fn list_members(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let members = state.organization_service.list_members(&auth, id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": members })))
}

/// POST /api/organizations/{id}/members
pub async fn add_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<AddMemberDto>,
) -> Result<Json<serde_json::Value>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let role: MemberRole = req.role.parse()?;

    let user = state
        .user_repo
        .find_by_email(&req.email.trim().to_lowercase())
        .await?
        .ok_or_else(|| AppError::not_found("No account with that email"))?;

    let member = state
        .organization_service
        .add_member(&auth, id, user.id, role)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": member })))
}

/// Body of a member role change.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct UpdateMemberRoleDto {
    /// The new role, `"admin"` or `"member"`.
    pub role: String,
}

/// PUT /api/organizations/{id}/members/{user_id}
pub async fn update_member_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateMemberRoleDto>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let role: MemberRole = req.role.parse()?;
    let member = state
        .organization_service
        .update_member_role(&auth, id, user_id, role)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": member })))
}

/// DELETE /api/organizations/{id}/members/{user_id}
pub async fn remove_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .organization_service
        .remove_member(&auth, id, user_id)
        .await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": { "message": "Member removed" } }),
    ))
}
