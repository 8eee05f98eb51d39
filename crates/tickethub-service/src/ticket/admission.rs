//! Door-side admission: lookup, scan redemption, and manual override.
//!
//! Every mutation loads the ticket with a row lock inside a transaction,
//! applies the state transition in memory, and persists the result before
//! releasing the lock, so two scanners racing on the same code serialize
//! cleanly.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use tickethub_core::error::{AppError, ErrorKind};
use tickethub_core::types::pagination::{PageRequest, PageResponse};
use tickethub_database::repositories::{EventRepository, SessionRepository, TicketRepository};
use tickethub_entity::event::Event;
use tickethub_entity::session::EventSession;
use tickethub_entity::ticket::{
    AvailableModes, RedemptionMode, Ticket, TicketStatus, redemption,
};

use crate::context::RequestContext;
use crate::organization::service::OrganizationService;

/// A ticket with its surrounding context, as shown on the scanner.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TicketDetails {
    /// The ticket.
    pub ticket: Ticket,
    /// Usage state derived from the admission counters.
    pub status: TicketStatus,
    /// The session the ticket admits to.
    pub session: EventSession,
    /// The event the session belongs to.
    pub event: Event,
    /// Redemption modes applicable in the current state.
    pub available_modes: AvailableModes,
}

/// Administrative status override.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ManualStatusRequest {
    /// Target used state.
    pub used: bool,
    /// Explicit headcount for group tickets. Defaults to all-or-nothing
    /// based on `used` when absent.
    pub used_count: Option<i32>,
}

/// Runs the admission workflow at the door.
#[derive(Debug, Clone)]
pub struct AdmissionService {
    /// Connection pool for redemption transactions.
    pool: PgPool,
    /// Ticket repository.
    ticket_repo: Arc<TicketRepository>,
    /// Session repository.
    session_repo: Arc<SessionRepository>,
    /// Event repository.
    event_repo: Arc<EventRepository>,
    /// Organization service for staff membership checks.
    org_service: Arc<OrganizationService>,
}

impl AdmissionService {
    /// Creates a new admission service.
    pub fn new(
        pool: PgPool,
        ticket_repo: Arc<TicketRepository>,
        session_repo: Arc<SessionRepository>,
        event_repo: Arc<EventRepository>,
        org_service: Arc<OrganizationService>,
    ) -> Self {
        Self {
            pool,
            ticket_repo,
            session_repo,
            event_repo,
            org_service,
        }
    }

    /// Looks up a ticket by its redemption code with full context.
    ///
    /// Staff must belong to the organization hosting the ticket's event.
    pub async fn lookup(&self, ctx: &RequestContext, code: Uuid) -> Result<TicketDetails, AppError> {
        let ticket = self
            .ticket_repo
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found("Ticket not found"))?;

        let details = self.resolve_context(ticket).await?;
        self.org_service
            .require_member(ctx, details.event.organization_id)
            .await?;
        Ok(details)
    }

    /// Redeems a ticket scanned at the door.
    ///
    /// `current_session_id` is the session the scanner is operating for;
    /// a ticket for any other session is rejected without mutation.
    pub async fn redeem(
        &self,
        ctx: &RequestContext,
        code: Uuid,
        mode: RedemptionMode,
        current_session_id: Uuid,
    ) -> Result<TicketDetails, AppError> {
        // Authorization first: resolve the org before mutating anything.
        let current = self
            .ticket_repo
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found("Ticket not found"))?;
        let context = self.resolve_context(current).await?;
        self.org_service
            .require_member(ctx, context.event.organization_id)
            .await?;

        let ticket = self
            .locked_transition(code, |ticket| {
                redemption::redeem(ticket, mode, current_session_id, chrono::Utc::now())
                    .map_err(AppError::from)
            })
            .await?;

        info!(
            ticket_id = %ticket.id,
            used_count = ticket.used_count,
            fully_used = ticket.fully_used,
            by = %ctx.user_id,
            "Redeemed ticket"
        );

        self.resolve_context(ticket).await
    }

    /// Applies an administrative status override. Admin only.
    ///
    /// Bypasses the scan-time guards so a mistaken admission can be
    /// corrected in either direction.
    pub async fn manual_override(
        &self,
        ctx: &RequestContext,
        code: Uuid,
        req: ManualStatusRequest,
    ) -> Result<TicketDetails, AppError> {
        // Authorization first: resolve the org before mutating anything.
        let current = self
            .ticket_repo
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found("Ticket not found"))?;
        let context = self.resolve_context(current).await?;
        self.org_service
            .require_admin(ctx, context.event.organization_id)
            .await?;

        let ticket = self
            .locked_transition(code, |ticket| {
                redemption::manual_set_status(ticket, req.used, req.used_count, chrono::Utc::now())
                    .map_err(AppError::from)
            })
            .await?;

        info!(
            ticket_id = %ticket.id,
            used_count = ticket.used_count,
            by = %ctx.user_id,
            "Manually overrode ticket status"
        );

        self.resolve_context(ticket).await
    }

    /// Lists the tickets issued for a session. Members only.
    pub async fn list_session_tickets(
        &self,
        ctx: &RequestContext,
        session_id: Uuid,
        page: PageRequest,
    ) -> Result<PageResponse<Ticket>, AppError> {
        let session = self
            .session_repo
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Session {session_id} not found")))?;
        let event = self
            .event_repo
            .find_by_id(session.event_id)
            .await?
            .ok_or_else(|| AppError::not_found("Event not found for session"))?;
        self.org_service
            .require_member(ctx, event.organization_id)
            .await?;

        self.ticket_repo.find_by_session(session_id, &page).await
    }

    /// Loads the ticket under a row lock, applies `transition`, and
    /// persists the result in the same transaction.
    async fn locked_transition<F>(&self, code: Uuid, transition: F) -> Result<Ticket, AppError>
    where
        F: FnOnce(&Ticket) -> Result<Ticket, AppError>,
    {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let ticket = self
            .ticket_repo
            .find_by_code_for_update_on(&mut *tx, code)
            .await?
            .ok_or_else(|| AppError::not_found("Ticket not found"))?;

        let updated = transition(&ticket)?;
        let persisted = self.ticket_repo.update_usage_on(&mut *tx, &updated).await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit redemption", e)
        })?;

        Ok(persisted)
    }

    /// Resolves the session and event a ticket belongs to.
    async fn resolve_context(&self, ticket: Ticket) -> Result<TicketDetails, AppError> {
        let session = self
            .session_repo
            .find_by_id(ticket.session_id)
            .await?
            .ok_or_else(|| AppError::not_found("Session not found for ticket"))?;
        let event = self
            .event_repo
            .find_by_id(session.event_id)
            .await?
            .ok_or_else(|| AppError::not_found("Event not found for session"))?;

        let status = ticket.status();
        let available_modes = redemption::available_modes(&ticket);
        Ok(TicketDetails {
            ticket,
            status,
            session,
            event,
            available_modes,
        })
    }
}
