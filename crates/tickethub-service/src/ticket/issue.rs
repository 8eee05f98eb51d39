//! Public ticket issuance.
//!
//! Issuance is the only write path into the capacity ledger. The whole
//! operation runs in one transaction that locks the session row, reads the
//! issued headcount, and inserts the new tickets, so two applicants racing
//! for the last seats cannot both succeed.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use tickethub_core::error::{AppError, ErrorKind};
use tickethub_database::repositories::{EventRepository, SessionRepository, TicketRepository};
use tickethub_entity::event::Event;
use tickethub_entity::session::EventSession;
use tickethub_entity::ticket::{NewTicket, Ticket};

use crate::capacity;
use crate::notification::Mailer;

/// Maximum number of individual tickets per application.
const MAX_TICKETS_PER_REQUEST: i32 = 10;

/// Public application for tickets to one session.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct IssueTicketsRequest {
    /// The session to issue against.
    pub session_id: Uuid,
    /// Applicant name.
    pub name: String,
    /// Phonetic reading of the applicant name.
    pub name_kana: String,
    /// Applicant e-mail address.
    pub email: String,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Whether to issue one group ticket instead of individual tickets.
    #[serde(default)]
    pub is_group: bool,
    /// Headcount of the group ticket. Falls back to `quantity` when absent.
    pub group_size: Option<i32>,
    /// Number of individual tickets to issue (1 to 10), or the group
    /// headcount when `is_group` is set without `group_size`.
    pub quantity: Option<i32>,
}

/// The outcome of a successful issuance.
#[derive(Debug, Clone, serde::Serialize)]
pub struct IssuedTickets {
    /// The event the session belongs to.
    pub event: Event,
    /// The session issued against.
    pub session: EventSession,
    /// The freshly issued tickets.
    pub tickets: Vec<Ticket>,
}

/// Issues tickets against session capacity.
#[derive(Debug, Clone)]
pub struct TicketIssueService {
    /// Connection pool for issuance transactions.
    pool: PgPool,
    /// Session repository.
    session_repo: Arc<SessionRepository>,
    /// Ticket repository.
    ticket_repo: Arc<TicketRepository>,
    /// Event repository, for mail content.
    event_repo: Arc<EventRepository>,
    /// Ticket e-mail delivery.
    mailer: Arc<Mailer>,
}

impl TicketIssueService {
    /// Creates a new issuance service.
    pub fn new(
        pool: PgPool,
        session_repo: Arc<SessionRepository>,
        ticket_repo: Arc<TicketRepository>,
        event_repo: Arc<EventRepository>,
        mailer: Arc<Mailer>,
    ) -> Self {
        Self {
            pool,
            session_repo,
            ticket_repo,
            event_repo,
            mailer,
        }
    }

    /// Issues tickets for a public application.
    ///
    /// The request is atomic: either every requested seat is granted or
    /// none is, and the rejection carries the actual remaining count.
    pub async fn issue(&self, req: IssueTicketsRequest) -> Result<IssuedTickets, AppError> {
        let plan = validate_request(&req)?;

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        // Lock the session row; concurrent issuers for this session
        // serialize here and each sees the previous one's tickets.
        let session = self
            .session_repo
            .find_for_update_on(&mut *tx, req.session_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Session {} not found", req.session_id)))?;

        let issued = self
            .session_repo
            .issued_headcount_on(&mut *tx, session.id)
            .await?;
        capacity::check_issuable(session.capacity, issued, plan.total_headcount as i64)?;

        let mut tickets = Vec::with_capacity(plan.ticket_count as usize);
        for _ in 0..plan.ticket_count {
            let ticket = self
                .ticket_repo
                .insert_on(
                    &mut *tx,
                    &NewTicket {
                        code: Uuid::new_v4(),
                        session_id: session.id,
                        name: req.name.trim().to_string(),
                        name_kana: req.name_kana.trim().to_string(),
                        email: req.email.trim().to_string(),
                        notes: req.notes.clone(),
                        is_group: req.is_group,
                        group_size: plan.group_size,
                    },
                )
                .await?;
            tickets.push(ticket);
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit issuance", e)
        })?;

        let event = self
            .event_repo
            .find_by_id(session.event_id)
            .await?
            .ok_or_else(|| AppError::not_found("Event not found for session"))?;

        info!(
            session_id = %session.id,
            ticket_count = tickets.len(),
            headcount = plan.total_headcount,
            "Issued tickets"
        );

        // Delivery is best-effort; the tickets are already committed.
        if let Err(e) = self
            .mailer
            .send_tickets_issued(&event, &session, &tickets)
            .await
        {
            warn!(error = %e, session_id = %session.id, "Ticket e-mail delivery failed");
        }

        Ok(IssuedTickets {
            event,
            session,
            tickets,
        })
    }

    /// Lists every ticket held by an applicant e-mail address.
    ///
    /// Applicants have no accounts; the address they applied with is the
    /// lookup key.
    pub async fn tickets_for_applicant(&self, email: &str) -> Result<Vec<Ticket>, AppError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AppError::validation("email is required"));
        }
        self.ticket_repo.find_by_email(email).await
    }
}

/// Validated issuance shape: how many ticket rows to insert, and the
/// headcount each carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct IssuePlan {
    ticket_count: i32,
    group_size: i32,
    total_headcount: i32,
}

fn validate_request(req: &IssueTicketsRequest) -> Result<IssuePlan, AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::validation("Name must not be empty"));
    }
    if req.name_kana.trim().is_empty() {
        return Err(AppError::validation("Name reading must not be empty"));
    }
    if !req.email.contains('@') {
        return Err(AppError::validation("Invalid email address"));
    }

    if req.is_group {
        // The headcount comes from group_size, or from quantity when the
        // form only sends the shared people-count field.
        let group_size = req
            .group_size
            .or(req.quantity)
            .ok_or_else(|| AppError::validation("group_size is required for group tickets"))?;
        if req.group_size.is_some() && req.quantity.is_some_and(|q| q != 1 && q != group_size) {
            return Err(AppError::validation("quantity and group_size disagree"));
        }
        if !(1..=MAX_TICKETS_PER_REQUEST).contains(&group_size) {
            return Err(AppError::validation(format!(
                "Group tickets cover 1 to {MAX_TICKETS_PER_REQUEST} people"
            )));
        }
        Ok(IssuePlan {
            ticket_count: 1,
            group_size,
            total_headcount: group_size,
        })
    } else {
        let quantity = req.quantity.unwrap_or(1);
        if !(1..=MAX_TICKETS_PER_REQUEST).contains(&quantity) {
            return Err(AppError::validation(format!(
                "Quantity must be between 1 and {MAX_TICKETS_PER_REQUEST}"
            )));
        }
        if req.group_size.is_some_and(|g| g != 1) {
            return Err(AppError::validation(
                "group_size only applies to group tickets",
            ));
        }
        Ok(IssuePlan {
            ticket_count: quantity,
            group_size: 1,
            total_headcount: quantity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickethub_core::error::ErrorKind;

    fn request() -> IssueTicketsRequest {
        IssueTicketsRequest {
            session_id: Uuid::new_v4(),
            name: "Yamada Taro".to_string(),
            name_kana: "やまだ たろう".to_string(),
            email: "taro@example.com".to_string(),
            notes: None,
            is_group: false,
            group_size: None,
            quantity: None,
        }
    }

    #[test]
    fn defaults_to_one_individual_ticket() {
        let plan = validate_request(&request()).unwrap();
        assert_eq!(
            plan,
            IssuePlan {
                ticket_count: 1,
                group_size: 1,
                total_headcount: 1
            }
        );
    }

    #[test]
    fn individual_quantity_is_bounded() {
        let mut req = request();
        req.quantity = Some(10);
        assert_eq!(validate_request(&req).unwrap().ticket_count, 10);

        req.quantity = Some(11);
        assert_eq!(
            validate_request(&req).unwrap_err().kind,
            ErrorKind::Validation
        );

        req.quantity = Some(0);
        assert!(validate_request(&req).is_err());
    }

    #[test]
    fn group_application_issues_one_ticket() {
        let mut req = request();
        req.is_group = true;
        req.group_size = Some(5);
        let plan = validate_request(&req).unwrap();
        assert_eq!(
            plan,
            IssuePlan {
                ticket_count: 1,
                group_size: 5,
                total_headcount: 5
            }
        );
    }

    #[test]
    fn group_headcount_falls_back_to_quantity() {
        let mut req = request();
        req.is_group = true;
        req.quantity = Some(5);
        let plan = validate_request(&req).unwrap();
        assert_eq!(plan.ticket_count, 1);
        assert_eq!(plan.group_size, 5);
    }

    #[test]
    fn group_of_one_is_a_valid_group_ticket() {
        let mut req = request();
        req.is_group = true;
        req.group_size = Some(1);
        let plan = validate_request(&req).unwrap();
        assert_eq!(
            plan,
            IssuePlan {
                ticket_count: 1,
                group_size: 1,
                total_headcount: 1
            }
        );
    }

    #[test]
    fn group_requires_a_headcount() {
        let mut req = request();
        req.is_group = true;
        req.group_size = None;
        req.quantity = None;
        assert!(validate_request(&req).is_err());
    }

    #[test]
    fn group_headcount_is_bounded() {
        let mut req = request();
        req.is_group = true;
        req.group_size = Some(11);
        assert!(validate_request(&req).is_err());

        req.group_size = Some(0);
        assert!(validate_request(&req).is_err());

        req.group_size = Some(5);
        req.quantity = Some(3);
        assert!(validate_request(&req).is_err());
    }

    #[test]
    fn rejects_blank_applicant_fields() {
        let mut req = request();
        req.name = "  ".to_string();
        assert!(validate_request(&req).is_err());

        let mut req = request();
        req.email = "not-an-email".to_string();
        assert!(validate_request(&req).is_err());
    }
}
