//! Session CRUD, occupancy, and statistics service.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use tickethub_core::error::AppError;
use tickethub_database::repositories::SessionRepository;
use tickethub_entity::session::{CreateEventSession, EventSession, SessionStats};

use crate::capacity;
use crate::context::RequestContext;
use crate::event::service::EventService;
use crate::organization::service::OrganizationService;

/// Request to update an existing session.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UpdateSessionRequest {
    /// New name.
    pub name: Option<String>,
    /// New start time.
    pub starts_at: Option<chrono::DateTime<chrono::Utc>>,
    /// New location.
    pub location: Option<String>,
    /// New capacity. May be set below the issued headcount; existing
    /// tickets stay valid and further issuance is blocked.
    pub capacity: Option<i32>,
}

/// A session together with its derived occupancy numbers.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SessionOccupancy {
    /// The session.
    pub session: EventSession,
    /// Per-session ticket statistics.
    pub stats: SessionStats,
    /// Seats still available for issuance. Negative when overbooked by a
    /// capacity edit.
    pub remaining_capacity: i64,
}

/// A session's capacity ledger view.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SessionCapacity {
    /// The session the numbers describe.
    pub session_id: Uuid,
    /// Configured seat capacity.
    pub capacity: i32,
    /// Seats taken by issued tickets, admitted or not.
    pub issued_headcount: i64,
    /// Seats still available for issuance. Negative when overbooked by a
    /// capacity edit.
    pub remaining_capacity: i64,
}

/// Manages sessions under events.
#[derive(Debug, Clone)]
pub struct SessionService {
    /// Session repository.
    session_repo: Arc<SessionRepository>,
    /// Event service for ownership resolution.
    event_service: Arc<EventService>,
    /// Organization service for membership checks.
    org_service: Arc<OrganizationService>,
}

impl SessionService {
    /// Creates a new session service.
    pub fn new(
        session_repo: Arc<SessionRepository>,
        event_service: Arc<EventService>,
        org_service: Arc<OrganizationService>,
    ) -> Self {
        Self {
            session_repo,
            event_service,
            org_service,
        }
    }

    /// Creates a session under an event. Admin only.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        event_id: Uuid,
        req: CreateEventSession,
    ) -> Result<EventSession, AppError> {
        let event = self.event_service.get(event_id).await?;
        self.org_service
            .require_admin(ctx, event.organization_id)
            .await?;

        if req.name.trim().is_empty() {
            return Err(AppError::validation("Session name must not be empty"));
        }
        if req.capacity < 1 {
            return Err(AppError::validation("Capacity must be at least 1"));
        }

        let session = self.session_repo.create(event_id, &req).await?;
        info!(session_id = %session.id, event_id = %event_id, capacity = session.capacity, "Created session");
        Ok(session)
    }

    /// Returns a session by ID. Public.
    pub async fn get(&self, id: Uuid) -> Result<EventSession, AppError> {
        self.session_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Session {id} not found")))
    }

    /// Returns the remaining capacity of a session. Public; the application
    /// form shows it before the applicant commits.
    ///
    /// Negative when capacity was edited below the issued headcount.
    pub async fn remaining_capacity(&self, id: Uuid) -> Result<SessionCapacity, AppError> {
        let session = self.get(id).await?;
        let issued = self.session_repo.issued_headcount(id).await?;
        Ok(SessionCapacity {
            session_id: id,
            capacity: session.capacity,
            issued_headcount: issued,
            remaining_capacity: capacity::remaining_capacity(session.capacity, issued),
        })
    }

    /// Lists all sessions of an event with remaining capacity. Public;
    /// applicants need the numbers to pick a session.
    pub async fn list_for_event(&self, event_id: Uuid) -> Result<Vec<SessionOccupancy>, AppError> {
        let sessions = self.session_repo.find_by_event(event_id).await?;
        let stats = self.session_repo.stats_by_event(event_id).await?;
        Ok(merge_occupancy(sessions, stats))
    }

    /// Admission statistics for every session of an event. Members only.
    pub async fn stats_for_event(
        &self,
        ctx: &RequestContext,
        event_id: Uuid,
    ) -> Result<Vec<SessionOccupancy>, AppError> {
        let event = self.event_service.get(event_id).await?;
        self.org_service
            .require_member(ctx, event.organization_id)
            .await?;

        self.list_for_event(event_id).await
    }

    /// Updates a session. Admin of the owning organization only.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        req: UpdateSessionRequest,
    ) -> Result<EventSession, AppError> {
        let mut session = self.get(id).await?;
        let event = self.event_service.get(session.event_id).await?;
        self.org_service
            .require_admin(ctx, event.organization_id)
            .await?;

        if let Some(name) = req.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(AppError::validation("Session name must not be empty"));
            }
            session.name = name;
        }
        if let Some(starts_at) = req.starts_at {
            session.starts_at = starts_at;
        }
        if let Some(location) = req.location {
            session.location = location;
        }
        if let Some(cap) = req.capacity {
            if cap < 1 {
                return Err(AppError::validation("Capacity must be at least 1"));
            }
            session.capacity = cap;
        }

        self.session_repo.update(&session).await
    }

    /// Deletes a session. Admin only; refused while tickets reference it.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), AppError> {
        let session = self.get(id).await?;
        let event = self.event_service.get(session.event_id).await?;
        self.org_service
            .require_admin(ctx, event.organization_id)
            .await?;
        self.session_repo.delete(id).await?;
        info!(session_id = %id, "Deleted session");
        Ok(())
    }
}

/// Join sessions with their stats rows; a session with no tickets gets
/// zeroed counters.
fn merge_occupancy(
    sessions: Vec<EventSession>,
    stats: Vec<SessionStats>,
) -> Vec<SessionOccupancy> {
    let mut by_session: HashMap<Uuid, SessionStats> =
        stats.into_iter().map(|s| (s.session_id, s)).collect();

    sessions
        .into_iter()
        .map(|session| {
            let stats = by_session.remove(&session.id).unwrap_or(SessionStats {
                session_id: session.id,
                ticket_count: 0,
                issued_headcount: 0,
                admitted_headcount: 0,
                fully_used_count: 0,
            });
            let remaining_capacity =
                capacity::remaining_capacity(session.capacity, stats.issued_headcount);
            SessionOccupancy {
                session,
                stats,
                remaining_capacity,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn session(id: Uuid, capacity: i32) -> EventSession {
        EventSession {
            id,
            event_id: Uuid::new_v4(),
            name: "Evening".to_string(),
            starts_at: Utc::now(),
            location: "Hall A".to_string(),
            capacity,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn occupancy_joins_stats_and_fills_gaps() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let merged = merge_occupancy(
            vec![session(a, 100), session(b, 50)],
            vec![SessionStats {
                session_id: a,
                ticket_count: 3,
                issued_headcount: 7,
                admitted_headcount: 4,
                fully_used_count: 1,
            }],
        );

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].remaining_capacity, 93);
        assert_eq!(merged[1].stats.ticket_count, 0);
        assert_eq!(merged[1].remaining_capacity, 50);
    }
}
