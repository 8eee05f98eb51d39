//! Event session repository implementation.
//!
//! Issuance serializes on the session row: [`SessionRepository::find_for_update_on`]
//! takes a `FOR UPDATE` lock inside the caller's transaction, and
//! [`SessionRepository::issued_headcount_on`] reads the capacity ledger under
//! that lock.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use tickethub_core::error::{AppError, ErrorKind};
use tickethub_core::result::AppResult;
use tickethub_entity::session::{CreateEventSession, EventSession, SessionStats};

/// Repository for event session CRUD and capacity queries.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    /// Create a new session repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new session under an event.
    pub async fn create(
        &self,
        event_id: Uuid,
        session: &CreateEventSession,
    ) -> AppResult<EventSession> {
        sqlx::query_as::<_, EventSession>(
            "INSERT INTO event_sessions (id, event_id, name, starts_at, location, capacity, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW()) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(event_id)
        .bind(&session.name)
        .bind(session.starts_at)
        .bind(&session.location)
        .bind(session.capacity)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create session", e))
    }

    /// Find a session by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<EventSession>> {
        sqlx::query_as::<_, EventSession>("SELECT * FROM event_sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find session", e))
    }

    /// Find a session and lock its row for the rest of the transaction.
    ///
    /// Concurrent issuers for the same session queue here, so the
    /// ledger read that follows sees every previously committed ticket.
    pub async fn find_for_update_on(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
    ) -> AppResult<Option<EventSession>> {
        sqlx::query_as::<_, EventSession>("SELECT * FROM event_sessions WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock session", e))
    }

    /// Sum the issued headcount for a session inside the caller's
    /// transaction.
    ///
    /// Counts people, not ticket rows: a group ticket of 5 occupies 5
    /// seats regardless of how many have been admitted.
    pub async fn issued_headcount_on(
        &self,
        conn: &mut PgConnection,
        session_id: Uuid,
    ) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(group_size), 0) FROM tickets WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_one(conn)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to sum issued headcount", e)
        })
    }

    /// Sum the issued headcount for a session without locking.
    ///
    /// Read-only ledger view; the issuance path uses
    /// [`SessionRepository::issued_headcount_on`] under the session lock
    /// instead.
    pub async fn issued_headcount(&self, session_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(group_size), 0) FROM tickets WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to sum issued headcount", e)
        })
    }

    /// List all sessions of an event, soonest first.
    pub async fn find_by_event(&self, event_id: Uuid) -> AppResult<Vec<EventSession>> {
        sqlx::query_as::<_, EventSession>(
            "SELECT * FROM event_sessions WHERE event_id = $1 ORDER BY starts_at ASC",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list sessions", e))
    }

    /// Admission statistics for every session of an event.
    ///
    /// Sessions without tickets still appear, with zeroed counters.
    pub async fn stats_by_event(&self, event_id: Uuid) -> AppResult<Vec<SessionStats>> {
        sqlx::query_as::<_, SessionStats>(
            "SELECT s.id AS session_id, \
                    COUNT(t.id) AS ticket_count, \
                    COALESCE(SUM(t.group_size), 0) AS issued_headcount, \
                    COALESCE(SUM(t.used_count), 0) AS admitted_headcount, \
                    COUNT(t.id) FILTER (WHERE t.fully_used) AS fully_used_count \
             FROM event_sessions s \
             LEFT JOIN tickets t ON t.session_id = s.id \
             WHERE s.event_id = $1 \
             GROUP BY s.id, s.starts_at \
             ORDER BY s.starts_at ASC",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to compute session stats", e)
        })
    }

    /// Update a session's editable fields.
    ///
    /// Capacity may be lowered below the issued headcount; existing tickets
    /// stay valid and further issuance is blocked until seats free up.
    pub async fn update(&self, session: &EventSession) -> AppResult<EventSession> {
        sqlx::query_as::<_, EventSession>(
            "UPDATE event_sessions SET name = $2, starts_at = $3, location = $4, \
             capacity = $5, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(session.id)
        .bind(&session.name)
        .bind(session.starts_at)
        .bind(&session.location)
        .bind(session.capacity)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update session", e))?
        .ok_or_else(|| AppError::not_found(format!("Session {} not found", session.id)))
    }

    /// Delete a session. Refused while issued tickets reference it.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM event_sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                    AppError::conflict("Session has issued tickets and cannot be deleted")
                }
                _ => AppError::with_source(ErrorKind::Database, "Failed to delete session", e),
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Session {id} not found")));
        }
        Ok(())
    }
}
