//! Ticket handlers: public issuance and door-side admission.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;
use validator::Validate;

use tickethub_core::error::AppError;
use tickethub_service::ticket::admission::ManualStatusRequest;

use crate::dto::request::{IssueTicketsDto, ManualStatusDto, RedeemRequest};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/tickets (public)
///
/// The ticket application form. No authentication; applicants are not
/// account holders.
pub async fn issue_tickets(
    State(state): State<AppState>,
    Json(req): Json<IssueTicketsDto>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let issued = state.issue_service.issue(req.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "success": true, "data": issued })),
    ))
}

/// Query parameters for the applicant ticket listing.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ApplicantTicketsParams {
    /// The e-mail address the tickets were applied for with.
    pub email: String,
}

/// GET /api/tickets?email=… (public)
///
/// Applicants have no accounts; the address they applied with is the
/// lookup key.
pub async fn list_applicant_tickets(
    State(state): State<AppState>,
    Query(params): Query<ApplicantTicketsParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let tickets = state
        .issue_service
        .tickets_for_applicant(&params.email)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": tickets })))
}

/// GET /api/tickets/{code}
///
/// Scanner lookup: the ticket with session, event, status, and the
/// redemption modes applicable in its current state.
pub async fn lookup_ticket(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(code): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let details = state.admission_service.lookup(&auth, code).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": details })))
}

/// POST /api/tickets/{code}/redeem
pub async fn redeem_ticket(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(code): Path<Uuid>,
    Json(req): Json<RedeemRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (mode, current_session_id) = req.into_parts();
    let details = state
        .admission_service
        .redeem(&auth, code, mode, current_session_id)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": details })))
}

/// PUT /api/tickets/{code}/status
///
/// Administrative override, bypassing scan-time guards.
pub async fn set_ticket_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(code): Path<Uuid>,
    Json(req): Json<ManualStatusDto>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let details = state
        .admission_service
        .manual_override(
            &auth,
            code,
            ManualStatusRequest {
                used: req.used,
                used_count: req.used_count,
            },
        )
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": details })))
}
