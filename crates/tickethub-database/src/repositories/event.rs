//! Event repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use tickethub_core::error::{AppError, ErrorKind};
use tickethub_core::result::AppResult;
use tickethub_core::types::pagination::{PageRequest, PageResponse};
use tickethub_entity::event::{CreateEvent, Event};

/// Repository for event CRUD and search operations.
#[derive(Debug, Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    /// Create a new event repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new event.
    pub async fn create(&self, event: &CreateEvent) -> AppResult<Event> {
        sqlx::query_as::<_, Event>(
            "INSERT INTO events (id, organization_id, name, description, tags, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, NOW(), NOW()) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(event.organization_id)
        .bind(&event.name)
        .bind(&event.description)
        .bind(&event.tags)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create event", e))
    }

    /// Find an event by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Event>> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find event", e))
    }

    /// List events for one organization, newest first.
    pub async fn find_by_organization(
        &self,
        organization_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Event>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM events WHERE organization_id = $1")
                .bind(organization_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count events", e)
                })?;

        let events = sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE organization_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(organization_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list events", e))?;

        Ok(PageResponse::new(
            events,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Public event listing with optional name/description search and tag
    /// filter. Both filters are conjunctive when present.
    pub async fn search(
        &self,
        query: Option<&str>,
        tag: Option<&str>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Event>> {
        // ILIKE over name and description; a missing filter matches all.
        let pattern = query.map(|q| format!("%{}%", q.replace('%', "\\%").replace('_', "\\_")));

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM events \
             WHERE ($1::text IS NULL OR name ILIKE $1 OR description ILIKE $1) \
             AND ($2::text IS NULL OR $2 = ANY(tags))",
        )
        .bind(&pattern)
        .bind(tag)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count search results", e)
        })?;

        let events = sqlx::query_as::<_, Event>(
            "SELECT * FROM events \
             WHERE ($1::text IS NULL OR name ILIKE $1 OR description ILIKE $1) \
             AND ($2::text IS NULL OR $2 = ANY(tags)) \
             ORDER BY created_at DESC LIMIT $3 OFFSET $4",
        )
        .bind(&pattern)
        .bind(tag)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to search events", e))?;

        Ok(PageResponse::new(
            events,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Update an event's editable fields.
    pub async fn update(&self, event: &Event) -> AppResult<Event> {
        sqlx::query_as::<_, Event>(
            "UPDATE events SET name = $2, description = $3, tags = $4, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(event.id)
        .bind(&event.name)
        .bind(&event.description)
        .bind(&event.tags)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update event", e))?
        .ok_or_else(|| AppError::not_found(format!("Event {} not found", event.id)))
    }

    /// Delete an event. Fails while sessions with issued tickets remain.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                    AppError::conflict("Event still has sessions with tickets and cannot be deleted")
                }
                _ => AppError::with_source(ErrorKind::Database, "Failed to delete event", e),
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Event {id} not found")));
        }
        Ok(())
    }
}
