//! Ticket repository implementation.
//!
//! Redemption serializes on the ticket row: the scan path loads the ticket
//! with `FOR UPDATE` inside a transaction, applies the state transition in
//! memory, and persists the result before the lock is released.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use tickethub_core::error::{AppError, ErrorKind};
use tickethub_core::result::AppResult;
use tickethub_core::types::pagination::{PageRequest, PageResponse};
use tickethub_entity::ticket::{NewTicket, Ticket};

/// Repository for ticket issuance, lookup, and usage updates.
#[derive(Debug, Clone)]
pub struct TicketRepository {
    pool: PgPool,
}

impl TicketRepository {
    /// Create a new ticket repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a ticket inside the caller's transaction.
    ///
    /// Runs under the session lock taken by the issuance path so the
    /// capacity check and the insert commit atomically.
    pub async fn insert_on(&self, conn: &mut PgConnection, ticket: &NewTicket) -> AppResult<Ticket> {
        sqlx::query_as::<_, Ticket>(
            "INSERT INTO tickets (id, code, session_id, name, name_kana, email, notes, \
             is_group, group_size, used_count, fully_used, used, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 0, FALSE, FALSE, NOW(), NOW()) \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(ticket.code)
        .bind(ticket.session_id)
        .bind(&ticket.name)
        .bind(&ticket.name_kana)
        .bind(&ticket.email)
        .bind(&ticket.notes)
        .bind(ticket.is_group)
        .bind(ticket.group_size)
        .fetch_one(conn)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::conflict("Ticket code collision, retry issuance")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to insert ticket", e),
        })
    }

    /// Find a ticket by its redemption code.
    pub async fn find_by_code(&self, code: Uuid) -> AppResult<Option<Ticket>> {
        sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find ticket", e))
    }

    /// Find a ticket by code and lock its row for the rest of the
    /// transaction. Concurrent scans of the same code queue here.
    pub async fn find_by_code_for_update_on(
        &self,
        conn: &mut PgConnection,
        code: Uuid,
    ) -> AppResult<Option<Ticket>> {
        sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE code = $1 FOR UPDATE")
            .bind(code)
            .fetch_optional(conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock ticket", e))
    }

    /// Persist the usage fields of a redeemed ticket inside the caller's
    /// transaction.
    ///
    /// Only the admission counters and timestamps are written; identity
    /// fields are immutable after issuance. The ticket's invariants are
    /// checked before the write.
    pub async fn update_usage_on(
        &self,
        conn: &mut PgConnection,
        ticket: &Ticket,
    ) -> AppResult<Ticket> {
        ticket
            .verify_invariants()
            .map_err(|msg| AppError::internal(format!("Refusing to persist ticket: {msg}")))?;

        sqlx::query_as::<_, Ticket>(
            "UPDATE tickets SET used_count = $2, fully_used = $3, used = $4, \
             used_at = $5, last_used_at = $6, updated_at = $7 \
             WHERE id = $1 RETURNING *",
        )
        .bind(ticket.id)
        .bind(ticket.used_count)
        .bind(ticket.fully_used)
        .bind(ticket.used)
        .bind(ticket.used_at)
        .bind(ticket.last_used_at)
        .bind(ticket.updated_at)
        .fetch_optional(conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update ticket", e))?
        .ok_or_else(|| AppError::not_found(format!("Ticket {} not found", ticket.id)))
    }

    /// List tickets held by an applicant e-mail address, newest first.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Vec<Ticket>> {
        sqlx::query_as::<_, Ticket>(
            "SELECT * FROM tickets WHERE email = $1 ORDER BY created_at DESC",
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list tickets by email", e)
        })
    }

    /// List tickets issued for a session, newest first.
    pub async fn find_by_session(
        &self,
        session_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Ticket>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tickets WHERE session_id = $1")
            .bind(session_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count tickets", e))?;

        let tickets = sqlx::query_as::<_, Ticket>(
            "SELECT * FROM tickets WHERE session_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(session_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list tickets", e))?;

        Ok(PageResponse::new(
            tickets,
            page.page,
            page.page_size,
            total as u64,
        ))
    }
}
